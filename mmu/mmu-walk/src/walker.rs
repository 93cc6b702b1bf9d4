//! # Table Walker
//!
//! Read-only traversal of a three-level tree described by a [`Geometry`].

use crate::dump::{BranchFault, Dump, PgdNode, PmdNode, PteLeaf, PteTable};
use crate::geometry::Geometry;
use crate::level::Level;
use crate::reader::{MemoryReader, UnreadableMemory};
use crate::resolve::{ResolveError, TranslationResult};
use crate::split::SplitAddress;
use crate::table::{ENTRY_SIZE, Entries};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::ControlFlow;
use mmu_addresses::{PhysicalAddress, VirtualAddress};

/// Walks page tables through a [`MemoryReader`].
///
/// The walker keeps no state between calls; every operation reads memory
/// afresh.
pub struct TableWalker<'r, R: ?Sized> {
    geometry: Geometry,
    reader: &'r R,
}

impl<'r, R: MemoryReader + ?Sized> TableWalker<'r, R> {
    #[must_use]
    pub const fn new(geometry: Geometry, reader: &'r R) -> Self {
        Self { geometry, reader }
    }

    #[inline]
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Lazily list the nonzero entries among `count` words at `table`.
    pub const fn enumerate(&self, table: VirtualAddress, count: usize) -> Entries<'r, R> {
        Entries::new(self.reader, table, count)
    }

    /// [`enumerate`](Self::enumerate) a whole table of `level`.
    pub const fn enumerate_level(&self, table: VirtualAddress, level: Level) -> Entries<'r, R> {
        self.enumerate(table, self.geometry.entries(level))
    }

    /// Collect the whole tree below the PGD at `root`.
    ///
    /// A table that cannot be read ends its branch only; the failure is
    /// recorded in [`Dump::faults`] and the walk continues with the next
    /// sibling.
    #[must_use]
    pub fn dump(&self, root: VirtualAddress) -> Dump {
        self.dump_with(root, |_, _| ControlFlow::Continue(()))
    }

    /// Like [`dump`](Self::dump), asking `control` before reading each table.
    ///
    /// `control` receives the level and base of the table about to be read.
    /// Returning [`ControlFlow::Break`] stops the walk; the partial tree is
    /// returned with [`Dump::cancelled`] set. Entries whose table was never
    /// read are not part of the result.
    pub fn dump_with<F>(&self, root: VirtualAddress, mut control: F) -> Dump
    where
        F: FnMut(Level, VirtualAddress) -> ControlFlow<()>,
    {
        let mut dump = Dump::new(root);
        dump.cancelled = self.dump_pgd(&mut dump, &mut control).is_break();

        log::info!(
            "{}: dumped {} PGD entries, {} leaves, {} faults{}",
            self.geometry.name(),
            dump.directories.len(),
            dump.leaf_count(),
            dump.faults.len(),
            if dump.cancelled { " (cancelled)" } else { "" }
        );
        dump
    }

    fn dump_pgd<F>(&self, dump: &mut Dump, control: &mut F) -> ControlFlow<()>
    where
        F: FnMut(Level, VirtualAddress) -> ControlFlow<()>,
    {
        control(Level::Pgd, dump.root)?;
        log::debug!("{}: scanning PGD at {}", self.geometry.name(), dump.root);

        for item in self.enumerate_level(dump.root, Level::Pgd) {
            let entry = match item {
                Ok(entry) => entry,
                Err(error) => {
                    record(&mut dump.faults, Level::Pgd, dump.root, error);
                    break;
                }
            };

            let pmd_base = self.geometry.table_address(entry.raw);
            control(Level::Pmd, pmd_base)?;

            let mut node = PgdNode {
                entry,
                pmd_base,
                middles: BTreeMap::new(),
                fault: None,
            };
            let flow = self.dump_pmd(&mut node, &mut dump.faults, control);
            dump.directories.insert(entry.index, node);
            flow?;
        }

        ControlFlow::Continue(())
    }

    fn dump_pmd<F>(
        &self,
        node: &mut PgdNode,
        faults: &mut Vec<BranchFault>,
        control: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(Level, VirtualAddress) -> ControlFlow<()>,
    {
        log::debug!(
            "{}: PGD[{}] -> PMD table at {}",
            self.geometry.name(),
            node.entry.index,
            node.pmd_base
        );

        for item in self.enumerate_level(node.pmd_base, Level::Pmd) {
            let entry = match item {
                Ok(entry) => entry,
                Err(error) => {
                    node.fault = Some(error);
                    record(faults, Level::Pmd, node.pmd_base, error);
                    break;
                }
            };

            if self.geometry.is_huge(entry.raw) {
                let leaf = self.geometry.decode_leaf(entry.raw);
                node.middles.insert(entry.index, PmdNode::Huge { entry, leaf });
                continue;
            }

            let pte_base = self.geometry.table_address(entry.raw);
            control(Level::Pte, pte_base)?;

            let mut table = PteTable {
                entry,
                pte_base,
                leaves: BTreeMap::new(),
                fault: None,
            };
            self.dump_pte(&mut table, faults);
            node.middles.insert(entry.index, PmdNode::Table(table));
        }

        ControlFlow::Continue(())
    }

    fn dump_pte(&self, table: &mut PteTable, faults: &mut Vec<BranchFault>) {
        log::debug!(
            "{}: PMD[{}] -> PTE table at {}",
            self.geometry.name(),
            table.entry.index,
            table.pte_base
        );

        for item in self.enumerate_level(table.pte_base, Level::Pte) {
            match item {
                Ok(entry) => {
                    let leaf = self.geometry.decode_leaf(entry.raw);
                    table.leaves.insert(entry.index, PteLeaf { entry, leaf });
                }
                Err(error) => {
                    table.fault = Some(error);
                    record(faults, Level::Pte, table.pte_base, error);
                    break;
                }
            }
        }
    }

    /// Translate `address` through the PGD at `root`.
    ///
    /// Reads exactly one entry per level visited. A PMD entry with the huge
    /// flag set ends the walk one level early. The in-page offset is taken
    /// with the leaf's own page size.
    ///
    /// # Errors
    /// - [`ResolveError::TranslationFault`] if an entry on the path is zero.
    /// - [`ResolveError::Unreadable`] if an entry cannot be read.
    /// - [`ResolveError::UnknownPageSize`] if the leaf's size code is unknown.
    pub fn resolve(
        &self,
        address: VirtualAddress,
        root: VirtualAddress,
    ) -> Result<TranslationResult, ResolveError> {
        let split = self.geometry.split(address);
        log::debug!(
            "{}: resolving {address} (PGD[{}] PMD[{}] PTE[{}] +{:#x})",
            self.geometry.name(),
            split.pgd_index,
            split.pmd_index,
            split.pte_index,
            split.page_offset
        );

        let pgd = self.lookup(Level::Pgd, root, &split)?;
        let pmd = self.lookup(Level::Pmd, self.geometry.table_address(pgd), &split)?;
        let (raw, level) = if self.geometry.is_huge(pmd) {
            (pmd, Level::Pmd)
        } else {
            let pte = self.lookup(Level::Pte, self.geometry.table_address(pmd), &split)?;
            (pte, Level::Pte)
        };

        let leaf = self.geometry.decode_leaf(raw);
        let page_size = self.geometry.page_size(raw)?;
        let physical_address = PhysicalAddress::new(
            self.geometry.frame_base(raw).as_u64() | address.offset_in(page_size),
        );

        log::debug!(
            "{}: {address} -> {physical_address} ({page_size} page at {level})",
            self.geometry.name()
        );

        Ok(TranslationResult {
            virtual_address: split,
            physical_address,
            leaf,
            level,
            page_size,
        })
    }

    /// Read the entry `split` selects in the `level` table at `table`.
    fn lookup(
        &self,
        level: Level,
        table: VirtualAddress,
        split: &SplitAddress,
    ) -> Result<u64, ResolveError> {
        let slot = table + split.index(level) as u64 * ENTRY_SIZE;
        let raw = self.reader.read_u64(slot)?;
        log::trace!("{level} entry at {slot} = {raw:#018x}");

        if raw == 0 {
            return Err(ResolveError::TranslationFault {
                level,
                address: split.address,
            });
        }
        Ok(raw)
    }
}

fn record(faults: &mut Vec<BranchFault>, level: Level, table: VirtualAddress, error: UnreadableMemory) {
    log::warn!("{level} table at {table} is unreadable, skipping branch: {error}");
    faults.push(BranchFault {
        level,
        table,
        error,
    });
}
