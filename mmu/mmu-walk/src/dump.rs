//! # Dump Tree
//!
//! The result of [`TableWalker::dump`](crate::TableWalker::dump): every
//! nonzero entry of the tree, keyed by table index at each level so
//! iteration is in ascending order.

use crate::level::Level;
use crate::reader::UnreadableMemory;
use crate::table::TableEntry;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use mmu_addresses::VirtualAddress;
use mmu_bits::DecodedWord;

/// The whole tree below one PGD.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dump {
    /// Address the PGD was read from.
    pub root: VirtualAddress,
    pub directories: BTreeMap<usize, PgdNode>,
    /// Every read failure, in walk order.
    pub faults: Vec<BranchFault>,
    /// Set if the walk was stopped before the tree was exhausted.
    pub cancelled: bool,
}

impl Dump {
    pub(crate) const fn new(root: VirtualAddress) -> Self {
        Self {
            root,
            directories: BTreeMap::new(),
            faults: Vec::new(),
            cancelled: false,
        }
    }

    /// `true` if every table was read completely.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.faults.is_empty()
    }

    /// Number of leaves (huge and regular) in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.directories
            .values()
            .flat_map(|pgd| pgd.middles.values())
            .map(|pmd| match pmd {
                PmdNode::Huge { .. } => 1,
                PmdNode::Table(table) => table.leaves.len(),
            })
            .sum()
    }
}

/// A present PGD entry and the PMD table it points to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PgdNode {
    pub entry: TableEntry,
    /// Where the PMD table was read from.
    pub pmd_base: VirtualAddress,
    pub middles: BTreeMap<usize, PmdNode>,
    /// Set if the PMD table could not be read completely.
    pub fault: Option<UnreadableMemory>,
}

/// A present PMD entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PmdNode {
    /// The huge flag is set: the entry is itself the leaf.
    Huge { entry: TableEntry, leaf: DecodedWord },
    /// The entry points to a PTE table.
    Table(PteTable),
}

impl PmdNode {
    #[must_use]
    pub const fn entry(&self) -> &TableEntry {
        match self {
            Self::Huge { entry, .. } => entry,
            Self::Table(table) => &table.entry,
        }
    }
}

/// A PMD entry pointing to a PTE table, and that table's leaves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PteTable {
    pub entry: TableEntry,
    /// Where the PTE table was read from.
    pub pte_base: VirtualAddress,
    pub leaves: BTreeMap<usize, PteLeaf>,
    pub fault: Option<UnreadableMemory>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PteLeaf {
    pub entry: TableEntry,
    pub leaf: DecodedWord,
}

/// A table that could not be read completely.
///
/// The branch keeps whatever entries were read before the failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BranchFault {
    /// Level of the table being read.
    pub level: Level,
    /// Base of the table being read.
    pub table: VirtualAddress,
    pub error: UnreadableMemory,
}
