//! # KVX
//!
//! Three-level tables with 4 KiB base pages and 40-bit virtual addresses.
//!
//! ```text
//!  63        23 22     13 12  11..10  9   8   7   6   5   4  3..2  1   0
//! +------------+---------+---+-------+---+---+---+---+---+---+----+---+---+
//! |    PFN     | Unused  | S | PageSZ| H | G | X | W | R | D | CP | A | P |
//! +------------+---------+---+-------+---+---+---+---+---+---+----+---+---+
//! ```
//!
//! The PGD spans two pages (`2 * 4096 / 8 = 1024` entries, 10 index bits).
//! Directory entries hold physical pointers; the kernel's linear map puts
//! physical address 0 at [`PAGE_OFFSET`]. A PMD entry with `H` set maps a
//! 2 MiB (or, as a run, 512 MiB) page directly.

use crate::labels;
use bitfield_struct::bitfield;
use mmu_addresses::{PageSizeClass, PageSizeEntry, PageSizeTable, PhysicalAddress};
use mmu_bits::FieldSpec;
use mmu_walk::GeometryConfig;

pub const PAGE_SHIFT: u8 = 12;
pub const PMD_SHIFT: u8 = 21;
pub const PGDIR_SHIFT: u8 = 30;
pub const VA_MAX_BITS: u8 = 40;

pub const PAGE_OFFSET: u64 = 0xffff_ff00_0000_0000;
pub const PHYS_OFFSET: u64 = 0;
pub const PA_TO_VA_OFFSET: u64 = PAGE_OFFSET - PHYS_OFFSET;

/// First bit of the frame number in a PTE.
pub const PFN_SHIFT: u8 = 23;

/// Marks a PMD entry as a huge leaf.
pub const HUGE: FieldSpec = FieldSpec::flag("H", 9);

pub const PTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::flag("P", 0),
    FieldSpec::flag("A", 1),
    FieldSpec::new("CP", 2, 2),
    FieldSpec::flag("D", 4),
    FieldSpec::flag("R", 5),
    FieldSpec::flag("W", 6),
    FieldSpec::flag("X", 7),
    FieldSpec::flag("G", 8),
    HUGE,
    FieldSpec::new("PageSZ", 10, 2),
    FieldSpec::flag("S", 12),
    FieldSpec::new("Unused", 13, 10),
    FieldSpec::new("PFN", PFN_SHIFT, 41),
];

/// Fields left out of the PTE flag summary.
pub const PTE_HIDDEN: &[&str] = &["PFN", "Unused", "PageSZ"];

/// PTE page-size codes, labelled the way the walk report prints them.
pub const PAGE_SIZES: PageSizeTable = PageSizeTable::new(
    "PageSZ",
    &[
        PageSizeEntry::new(0, PageSizeClass::Size4K, "4 Ko"),
        PageSizeEntry::new(1, PageSizeClass::Size64K, "64 Ko"),
        PageSizeEntry::new(2, PageSizeClass::Size2M, "2 Mo"),
        PageSizeEntry::new(3, PageSizeClass::Size512M, "512 Mo"),
    ],
);

/// `$tel`, bits 8..=9 are reserved.
pub const TEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("es", 0, 2),
    FieldSpec::new("cp", 2, 2),
    FieldSpec::new("pa", 4, 4),
    FieldSpec::new("ps", 10, 2),
    FieldSpec::new("fn", 12, 28),
];

/// `$teh`.
pub const TEH_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("asn", 0, 9),
    FieldSpec::flag("g", 9),
    FieldSpec::new("vs", 10, 2),
    FieldSpec::new("pn", 12, 29),
];

pub const GEOMETRY: GeometryConfig = GeometryConfig {
    name: "kvx",
    pgd_bits: VA_MAX_BITS - PGDIR_SHIFT,
    pmd_bits: PGDIR_SHIFT - PMD_SHIFT,
    pte_bits: PMD_SHIFT - PAGE_SHIFT,
    page_shift: PAGE_SHIFT,
    phys_to_virt_offset: PA_TO_VA_OFFSET,
    huge_flag: Some(HUGE),
    leaf_name: "kvx-pte",
    leaf_fields: PTE_FIELDS,
    pfn_field: "PFN",
    frame_shift: PAGE_SHIFT,
    page_size_field: Some("PageSZ"),
    page_sizes: PAGE_SIZES,
};

pub(crate) const TLB: crate::TlbConfig = crate::TlbConfig {
    tel: ("kvx-tel", TEL_FIELDS),
    teh: ("kvx-teh", TEH_FIELDS),
    labels: &[
        labels::ENTRY_STATUS,
        labels::CACHE_POLICY,
        labels::PROTECTION,
        labels::PAGE_SIZE,
        labels::GLOBAL,
    ],
    hex: &["fn", "pn"],
};

/// Typed view of a KVX page-table entry.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Pte {
    /// Bit 0, P: present.
    pub present: bool,
    /// Bit 1, A: accessed.
    pub accessed: bool,
    /// Bits 2–3, CP: cache policy code.
    #[bits(2)]
    pub cache_policy: u8,
    /// Bit 4, D: dirty.
    pub dirty: bool,
    pub read: bool,
    pub write: bool,
    pub exec: bool,
    /// Bit 8, G: global, ignores the ASN.
    pub global: bool,
    /// Bit 9, H: huge page, only meaningful in a PMD entry.
    pub huge: bool,
    /// Bits 10–11, PageSZ: page size code, see [`PAGE_SIZES`].
    #[bits(2)]
    pub page_size: u8,
    /// Bit 12, S: software.
    pub soft: bool,
    #[bits(10)]
    __: u16,
    /// Bits 23–63, frame number.
    #[bits(41)]
    pub pfn: u64,
}

impl Pte {
    /// A present leaf mapping the frame at `frame`.
    #[must_use]
    pub const fn leaf(frame: PhysicalAddress, page_size: PageSizeClass) -> Self {
        let code = match page_size {
            PageSizeClass::Size4K => 0,
            PageSizeClass::Size64K => 1,
            PageSizeClass::Size2M => 2,
            PageSizeClass::Size512M => 3,
        };
        Self::new()
            .with_present(true)
            .with_accessed(true)
            .with_page_size(code)
            .with_pfn(frame.as_u64() >> PAGE_SHIFT)
    }

    /// Frame base address.
    #[must_use]
    pub const fn frame(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.pfn() << PAGE_SHIFT)
    }
}

/// Typed view of `$tel`.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Tel {
    /// Bits 0–1, entry status.
    #[bits(2)]
    pub es: u8,
    /// Bits 2–3, cache policy.
    #[bits(2)]
    pub cp: u8,
    /// Bits 4–7, protection attributes.
    #[bits(4)]
    pub pa: u8,
    #[bits(2)]
    __r: u8,
    /// Bits 10–11, page size.
    #[bits(2)]
    pub ps: u8,
    /// Bits 12–39, frame number.
    #[bits(28)]
    pub frame: u32,
    #[bits(24)]
    __pad: u32,
}

/// Typed view of `$teh`.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Teh {
    /// Bits 0–8, address space number.
    #[bits(9)]
    pub asn: u16,
    /// Bit 9, global.
    pub g: bool,
    /// Bits 10–11, virtual space.
    #[bits(2)]
    pub vs: u8,
    /// Bits 12–40, page number.
    #[bits(29)]
    pub pn: u32,
    #[bits(23)]
    __pad: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmu_bits::Layout;
    use mmu_walk::Geometry;

    #[test]
    fn geometry_matches_kernel_constants() {
        let geometry = Geometry::new(GEOMETRY).expect("valid");
        assert_eq!(geometry.entries(mmu_walk::Level::Pgd), 2 * 4096 / 8);
        assert_eq!(geometry.entries(mmu_walk::Level::Pmd), 512);
        assert_eq!(geometry.entries(mmu_walk::Level::Pte), 512);
        assert_eq!(geometry.address_bits(), VA_MAX_BITS);
        assert_eq!(geometry.phys_to_virt_offset(), 0xffff_ff00_0000_0000);
    }

    #[test]
    fn pte_layout_matches_typed_view() {
        let layout = Layout::new("kvx-pte", PTE_FIELDS).expect("valid");
        let pte = Pte::new()
            .with_present(true)
            .with_cache_policy(2)
            .with_read(true)
            .with_global(true)
            .with_huge(true)
            .with_page_size(3)
            .with_soft(true)
            .with_pfn(0x1_2345_6789);
        let word = layout.decode(pte.into_bits());

        assert_eq!(word.get("P"), Some(1));
        assert_eq!(word.get("A"), Some(0));
        assert_eq!(word.get("CP"), Some(2));
        assert_eq!(word.get("R"), Some(1));
        assert_eq!(word.get("G"), Some(1));
        assert_eq!(word.get("H"), Some(1));
        assert_eq!(word.get("PageSZ"), Some(3));
        assert_eq!(word.get("S"), Some(1));
        assert_eq!(word.get("Unused"), Some(0));
        assert_eq!(word.get("PFN"), Some(0x1_2345_6789));
        assert_eq!(layout.used_bits(), u64::MAX);
    }

    #[test]
    fn every_single_pte_bit_lands_in_the_same_field() {
        let layout = Layout::new("kvx-pte", PTE_FIELDS).expect("valid");
        for bit in 0..64 {
            let raw = 1u64 << bit;
            let typed = Pte::from_bits(raw);
            let word = layout.decode(raw);
            assert_eq!(word.get("P") == Some(1), typed.present(), "bit {bit}");
            assert_eq!(word.get("H") == Some(1), typed.huge(), "bit {bit}");
            assert_eq!(word.get("PageSZ"), Some(u64::from(typed.page_size())), "bit {bit}");
            assert_eq!(word.get("PFN"), Some(typed.pfn()), "bit {bit}");
        }
    }

    #[test]
    fn tlb_layouts_match_typed_views() {
        let tlb = crate::Tlb::new(TLB).expect("valid");
        let (tel_layout, teh_layout) = (tlb.tel(), tlb.teh());
        assert_eq!(tel_layout.name(), "kvx-tel");

        let tel = Tel::new()
            .with_es(1)
            .with_cp(2)
            .with_pa(13)
            .with_ps(2)
            .with_frame(0x0abc_def0);
        let word = tel_layout.decode(tel.into_bits());
        assert_eq!(word.get("es"), Some(1));
        assert_eq!(word.get("cp"), Some(2));
        assert_eq!(word.get("pa"), Some(13));
        assert_eq!(word.get("ps"), Some(2));
        assert_eq!(word.get("fn"), Some(0x0abc_def0));

        let teh = Teh::new()
            .with_asn(0x1ff)
            .with_g(true)
            .with_vs(3)
            .with_pn(0x1fff_ffff);
        let word = teh_layout.decode(teh.into_bits());
        assert_eq!(word.get("asn"), Some(0x1ff));
        assert_eq!(word.get("g"), Some(1));
        assert_eq!(word.get("vs"), Some(3));
        assert_eq!(word.get("pn"), Some(0x1fff_ffff));
        assert_eq!(teh_layout.used_bits(), (1 << 41) - 1);
    }

    #[test]
    fn leaf_builder() {
        let pte = Pte::leaf(PhysicalAddress::new(0x8020_0000), PageSizeClass::Size2M);
        assert!(pte.present());
        assert_eq!(pte.page_size(), 2);
        assert_eq!(pte.frame().as_u64(), 0x8020_0000);
        assert_eq!(pte.into_bits() >> PFN_SHIFT, 0x8_0200);
    }
}
