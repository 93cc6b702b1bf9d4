//! # Text Reports
//!
//! Renders walker results in the layout debugger users already know:
//!
//! ```text
//! > Looking for PGD base 0x0000000000001000
//! [1] -> Entry[0x0000000000002000]
//! 	> Looking for PMD base 0x0000000000002000
//! 	[5] -> Entry[0x0000000000003000]
//! 		> Looking for PTE base 0x0000000000003000
//! 		[0] -> PTE [0x0000000000020003]
//! 		PFN: 0x0000000000080000, PS: 4 Ko, bits: R P
//! ```
//!
//! Addresses and raw words are always 16 zero-padded hex digits. Read
//! failures are reported in place with a `!` marker.

use core::fmt;
use mmu_arch::{Tlb, TlbEntry};
use mmu_bits::{DecodedWord, Labelled};
use mmu_walk::{Dump, Geometry, Level, PmdNode, PteTable, TranslationResult};
use std::io::{self, Write};

/// Renders one decoded leaf: `PFN: 0x…, PS: <label>, bits: <flags>`.
pub struct LeafLine<'a> {
    geometry: &'a Geometry,
    hidden: &'a [&'a str],
    leaf: &'a DecodedWord,
}

impl<'a> LeafLine<'a> {
    pub const fn new(geometry: &'a Geometry, hidden: &'a [&'a str], leaf: &'a DecodedWord) -> Self {
        Self {
            geometry,
            hidden,
            leaf,
        }
    }

    fn page_size(&self) -> Labelled {
        match self.geometry.page_size(self.leaf.raw()) {
            Ok(class) => Labelled::Known(self.geometry.page_sizes().label_for(class)),
            Err(unknown) => Labelled::Unknown(unknown.value),
        }
    }
}

impl fmt::Display for LeafLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PFN: {}, PS: {}, bits:",
            self.geometry.frame_base(self.leaf.raw()),
            self.page_size()
        )?;
        for flag in self.leaf.set_fields(self.hidden) {
            write!(f, " {flag}")?;
        }
        Ok(())
    }
}

/// Writes dumps and translations for one architecture.
pub struct Reporter<'a> {
    geometry: &'a Geometry,
    hidden: &'a [&'a str],
}

impl<'a> Reporter<'a> {
    pub const fn new(geometry: &'a Geometry, hidden: &'a [&'a str]) -> Self {
        Self { geometry, hidden }
    }

    const fn leaf<'b>(&'b self, leaf: &'b DecodedWord) -> LeafLine<'b> {
        LeafLine::new(self.geometry, self.hidden, leaf)
    }

    pub fn write_leaf<W: Write>(&self, out: &mut W, raw: u64) -> io::Result<()> {
        let leaf = self.geometry.decode_leaf(raw);
        writeln!(out, "{}", self.leaf(&leaf))
    }

    pub fn write_dump<W: Write>(&self, out: &mut W, dump: &Dump) -> io::Result<()> {
        writeln!(out, "> Looking for PGD base {}", dump.root)?;
        for (index, pgd) in &dump.directories {
            writeln!(out, "[{index}] -> Entry[0x{:016x}]", pgd.entry.raw)?;
            writeln!(out, "\t> Looking for PMD base 0x{:016x}", pgd.entry.raw)?;
            for (index, pmd) in &pgd.middles {
                writeln!(out, "\t[{index}] -> Entry[0x{:016x}]", pmd.entry().raw)?;
                match pmd {
                    PmdNode::Huge { leaf, .. } => {
                        writeln!(out, "\t\t> Huge PTE: {}", self.leaf(leaf))?;
                    }
                    PmdNode::Table(table) => self.write_pte_table(out, table)?,
                }
            }
            if let Some(error) = pgd.fault {
                writeln!(out, "\t! {error}")?;
            }
        }

        for fault in dump.faults.iter().filter(|f| f.level == Level::Pgd) {
            writeln!(out, "! {}", fault.error)?;
        }
        if dump.cancelled {
            writeln!(out, "! walk cancelled")?;
        }
        Ok(())
    }

    fn write_pte_table<W: Write>(&self, out: &mut W, table: &PteTable) -> io::Result<()> {
        writeln!(out, "\t\t> Looking for PTE base 0x{:016x}", table.entry.raw)?;
        for (index, pte) in &table.leaves {
            writeln!(out, "\t\t[{index}] -> PTE [0x{:016x}]", pte.entry.raw)?;
            writeln!(out, "\t\t{}", self.leaf(&pte.leaf))?;
        }
        if let Some(error) = table.fault {
            writeln!(out, "\t\t! {error}")?;
        }
        Ok(())
    }

    pub fn write_translation<W: Write>(
        &self,
        out: &mut W,
        result: &TranslationResult,
    ) -> io::Result<()> {
        writeln!(out, "{}", self.leaf(&result.leaf))?;
        writeln!(out, "Physical address: {}", result.physical_address)
    }
}

/// `tel:` and `teh:` blocks, one `\tname:\tvalue` line per field.
pub fn write_tlb<W: Write>(out: &mut W, tlb: &Tlb, entry: &TlbEntry) -> io::Result<()> {
    for (name, word) in [("tel", &entry.tel), ("teh", &entry.teh)] {
        writeln!(out, "{name}:")?;
        for (field, value) in word.iter() {
            writeln!(out, "\t{field}:\t{}", tlb.render(field, value))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmu_addresses::{PageSizeClass, PhysicalAddress, VirtualAddress};
    use mmu_arch::Arch;
    use mmu_arch::kvx::Pte;
    use mmu_walk::{MemoryReader, TableWalker, UnreadableMemory};
    use std::collections::HashMap;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).expect("write to Vec");
        String::from_utf8(out).expect("utf-8")
    }

    fn kvx() -> Geometry {
        Arch::Kvx.geometry().expect("geometry")
    }

    #[test]
    fn leaf_line_lists_flags_most_significant_first() {
        let geometry = kvx();
        let raw = Pte::leaf(PhysicalAddress::new(0x8123_4000), PageSizeClass::Size64K)
            .with_read(true)
            .with_exec(true)
            .with_global(true)
            .into_bits();
        let reporter = Reporter::new(&geometry, Arch::Kvx.hidden_leaf_fields());
        assert_eq!(
            render(|out| reporter.write_leaf(out, raw)),
            "PFN: 0x0000000081234000, PS: 64 Ko, bits: G X R A P\n"
        );
    }

    #[test]
    fn cached_mapping_lists_the_cache_policy() {
        let geometry = kvx();
        let raw = Pte::leaf(PhysicalAddress::new(0x8123_4000), PageSizeClass::Size4K)
            .with_cache_policy(2)
            .with_read(true)
            .into_bits();
        let reporter = Reporter::new(&geometry, Arch::Kvx.hidden_leaf_fields());
        assert_eq!(
            render(|out| reporter.write_leaf(out, raw)),
            "PFN: 0x0000000081234000, PS: 4 Ko, bits: R CP A P\n"
        );
    }

    #[test]
    fn leaf_line_without_flags() {
        let geometry = Arch::K1c.geometry().expect("geometry");
        let reporter = Reporter::new(&geometry, Arch::K1c.hidden_leaf_fields());
        assert_eq!(
            render(|out| reporter.write_leaf(out, 0x2000 << 10)),
            "PFN: 0x0000000002000000, PS: 4 Ko, bits:\n"
        );
    }

    #[test]
    fn page_size_uses_the_arch_labels() {
        let geometry = kvx();
        let field = geometry.page_size_field().expect("kvx has PageSZ");
        let raw = field.insert(0, 3) | (1 << 23);
        let reporter = Reporter::new(&geometry, Arch::Kvx.hidden_leaf_fields());
        assert_eq!(
            render(|out| reporter.write_leaf(out, raw)),
            "PFN: 0x0000000000001000, PS: 512 Mo, bits:\n"
        );

        // K1C leaves carry no size code; every leaf is a base page.
        let geometry = Arch::K1c.geometry().expect("geometry");
        let reporter = Reporter::new(&geometry, Arch::K1c.hidden_leaf_fields());
        assert!(render(|out| reporter.write_leaf(out, u64::MAX)).contains("PS: 4 Ko"));
    }

    struct Words(HashMap<u64, u64>);

    impl MemoryReader for Words {
        fn read(&self, address: VirtualAddress, buf: &mut [u8]) -> Result<(), UnreadableMemory> {
            if address.as_u64() >= 0x9000 {
                return Err(UnreadableMemory { address });
            }
            let word = self.0.get(&address.as_u64()).copied().unwrap_or(0);
            buf.copy_from_slice(&word.to_le_bytes());
            Ok(())
        }
    }

    #[test]
    fn dump_layout() {
        let geometry = Arch::K1c.geometry().expect("geometry");
        let leaf = (0x80 << 10) | 0b11;
        let memory = Words(HashMap::from([
            (0x1000 + 8, 0x2000),
            (0x1000 + 16, 0x9000),
            (0x2000 + 5 * 8, 0x3000),
            (0x3000, leaf),
        ]));
        let walker = TableWalker::new(geometry, &memory);
        let dump = walker.dump(VirtualAddress::new(0x1000));
        let reporter = Reporter::new(&geometry, Arch::K1c.hidden_leaf_fields());

        assert_eq!(
            render(|out| reporter.write_dump(out, &dump)),
            "> Looking for PGD base 0x0000000000001000\n\
             [1] -> Entry[0x0000000000002000]\n\
             \t> Looking for PMD base 0x0000000000002000\n\
             \t[5] -> Entry[0x0000000000003000]\n\
             \t\t> Looking for PTE base 0x0000000000003000\n\
             \t\t[0] -> PTE [0x0000000000020003]\n\
             \t\tPFN: 0x0000000000080000, PS: 4 Ko, bits: R P\n\
             [2] -> Entry[0x0000000000009000]\n\
             \t> Looking for PMD base 0x0000000000009000\n\
             \t! cannot read memory at 0x0000000000009000\n"
        );
    }

    #[test]
    fn tlb_blocks() {
        let tlb = Arch::K1c.tlb().expect("tlb");
        let entry = tlb.decode(0x0000_0000_8000_0091, (0x4_0000 << 12) | (1 << 9) | 5);
        assert_eq!(
            render(|out| write_tlb(out, &tlb, &entry)),
            "tel:\n\
             \tes:\tPresent\n\
             \tcp:\tDevice/Uncached\n\
             \tpa:\tRW_RW\n\
             \tfn:\t0x0000000000080000\n\
             teh:\n\
             \tasn:\t5\n\
             \tg:\tGlobal\n\
             \tps:\t4K\n\
             \tpn:\t0x0000000000040000\n"
        );
    }
}
