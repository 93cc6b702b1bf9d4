//! # K1C
//!
//! The predecessor of KVX. Page tables are a software format (no hardware
//! walker), three levels of 512 entries with 4 KiB pages and no huge pages.
//! Directory entries already hold addresses the debugger can read.
//!
//! ```text
//! | 63   10 |  9   |  8  | 7 | 6 | 5 | 4 | 3 | 2 | 1 | 0 |
//! |   PFN   | SOFT | DEV | D | A | G | U | X | W | R | P |
//! ```

use crate::labels;
use mmu_addresses::{PageSizeClass, PageSizeEntry, PageSizeTable};
use mmu_bits::FieldSpec;
use mmu_walk::GeometryConfig;

pub const PAGE_SHIFT: u8 = 12;

/// First bit of the frame number in a PTE.
pub const PFN_SHIFT: u8 = 10;

pub const PTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::flag("P", 0),
    FieldSpec::flag("R", 1),
    FieldSpec::flag("W", 2),
    FieldSpec::flag("X", 3),
    FieldSpec::flag("U", 4),
    FieldSpec::flag("G", 5),
    FieldSpec::flag("A", 6),
    FieldSpec::flag("D", 7),
    FieldSpec::flag("DEV", 8),
    FieldSpec::flag("SOFT", 9),
    FieldSpec::new("PFN", PFN_SHIFT, 54),
];

pub const PTE_HIDDEN: &[&str] = &["PFN"];

/// Leaves carry no size code; only the base page is listed.
pub const PAGE_SIZES: PageSizeTable = PageSizeTable::new(
    "PS",
    &[PageSizeEntry::new(0, PageSizeClass::Size4K, "4 Ko")],
);

pub const TEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("es", 0, 2),
    FieldSpec::new("cp", 2, 2),
    FieldSpec::new("pa", 4, 4),
    FieldSpec::new("fn", 12, 28),
];

/// `$teh`; unlike KVX the page size lives here.
pub const TEH_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("asn", 0, 9),
    FieldSpec::flag("g", 9),
    FieldSpec::new("ps", 10, 2),
    FieldSpec::new("pn", 12, 29),
];

pub const GEOMETRY: GeometryConfig = GeometryConfig {
    name: "k1c",
    pgd_bits: 9,
    pmd_bits: 9,
    pte_bits: 9,
    page_shift: PAGE_SHIFT,
    phys_to_virt_offset: 0,
    huge_flag: None,
    leaf_name: "k1c-pte",
    leaf_fields: PTE_FIELDS,
    pfn_field: "PFN",
    frame_shift: PAGE_SHIFT,
    page_size_field: None,
    page_sizes: PAGE_SIZES,
};

pub(crate) const TLB: crate::TlbConfig = crate::TlbConfig {
    tel: ("k1c-tel", TEL_FIELDS),
    teh: ("k1c-teh", TEH_FIELDS),
    labels: &[
        labels::ENTRY_STATUS,
        labels::CACHE_POLICY,
        labels::PROTECTION,
        labels::PAGE_SIZE,
        labels::GLOBAL,
    ],
    hex: &["fn", "pn"],
};
