//! Labels for the enumerated TLB fields, shared by KVX and K1C.

use mmu_bits::ValueLabels;

pub const ENTRY_STATUS: ValueLabels = ValueLabels::new(
    "es",
    &[
        (0, "Invalid"),
        (1, "Present"),
        (2, "Modified"),
        (3, "A-Modified"),
    ],
);

/// Data/instruction cache policy pairs.
pub const CACHE_POLICY: ValueLabels = ValueLabels::new(
    "cp",
    &[
        (0, "Device/Uncached"),
        (1, "Uncached/Uncached"),
        (2, "WriteThrough/Cached"),
        (3, "Unchached/Cached"),
    ],
);

/// Protection attributes, privileged/user. Codes 14 and 15 are unassigned.
pub const PROTECTION: ValueLabels = ValueLabels::new(
    "pa",
    &[
        (0, "NA_NA"),
        (1, "NA_R"),
        (2, "NA_RW"),
        (3, "NA_RX"),
        (4, "NA_RWX"),
        (5, "R_R"),
        (6, "R_RW"),
        (7, "R_RX"),
        (8, "R_RWX"),
        (9, "RW_RW"),
        (10, "RW_RWX"),
        (11, "RX_RX"),
        (12, "RX_RWX"),
        (13, "RWX_RWX"),
    ],
);

pub const PAGE_SIZE: ValueLabels =
    ValueLabels::new("ps", &[(0, "4K"), (1, "64K"), (2, "2M"), (3, "512M")]);

pub const GLOBAL: ValueLabels = ValueLabels::new("g", &[(0, "Use ASN"), (1, "Global")]);

#[cfg(test)]
mod tests {
    use super::*;
    use mmu_addresses::PageSizeClass;

    #[test]
    fn tlb_page_size_labels_match_classes() {
        for (code, class) in PageSizeClass::ALL.into_iter().enumerate() {
            assert_eq!(PAGE_SIZE.label(code as u64), Ok(class.as_str()));
        }
    }

    #[test]
    fn unassigned_protection_codes_are_unknown() {
        assert_eq!(PROTECTION.label(13), Ok("RWX_RWX"));
        assert!(PROTECTION.label(14).is_err());
        assert_eq!(PROTECTION.describe(15).to_string(), "unknown (15)");
    }
}
