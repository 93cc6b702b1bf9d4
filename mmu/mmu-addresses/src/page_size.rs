//! # Page Sizes
//!
//! The MMU supports four page sizes. A leaf entry carries a small size code;
//! the architecture's [`PageSizeTable`] maps that code to a [`PageSizeClass`],
//! whose shift drives offset masking when translating an address.

use core::fmt;
use mmu_bits::UnknownEnumValue;

/// Supported page sizes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PageSizeClass {
    /// 4 KiB, the base page.
    Size4K,
    /// 64 KiB, a run of 16 contiguous base pages held in a PTE table.
    Size64K,
    /// 2 MiB, a huge page terminating the walk at the PMD level.
    Size2M,
    /// 512 MiB, a run of PMD-level huge entries.
    Size512M,
}

impl PageSizeClass {
    pub const ALL: [Self; 4] = [Self::Size4K, Self::Size64K, Self::Size2M, Self::Size512M];

    /// log2 of the page size, i.e. the number of offset bits.
    #[inline]
    #[must_use]
    pub const fn shift(self) -> u8 {
        match self {
            Self::Size4K => 12,
            Self::Size64K => 16,
            Self::Size2M => 21,
            Self::Size512M => 29,
        }
    }

    /// Page size in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> u64 {
        1 << self.shift()
    }

    /// Mask of the in-page offset bits.
    #[inline]
    #[must_use]
    pub const fn offset_mask(self) -> u64 {
        self.size() - 1
    }

    /// Short label, as used by TLB dumps.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size4K => "4K",
            Self::Size64K => "64K",
            Self::Size2M => "2M",
            Self::Size512M => "512M",
        }
    }

    /// The class whose shift is `shift`, if any.
    #[must_use]
    pub const fn from_shift(shift: u8) -> Option<Self> {
        match shift {
            12 => Some(Self::Size4K),
            16 => Some(Self::Size64K),
            21 => Some(Self::Size2M),
            29 => Some(Self::Size512M),
            _ => None,
        }
    }
}

impl fmt::Display for PageSizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a [`PageSizeTable`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PageSizeEntry {
    /// Hardware code as stored in the page-size field.
    pub code: u64,
    pub class: PageSizeClass,
    /// Display label used by this architecture's reports.
    pub label: &'static str,
}

impl PageSizeEntry {
    #[must_use]
    pub const fn new(code: u64, class: PageSizeClass, label: &'static str) -> Self {
        Self { code, class, label }
    }
}

/// Per-architecture page-size configuration.
///
/// `shift_for` and `label_for` are total over [`PageSizeClass`]; a class
/// without a row falls back to its short label. Only
/// [`class_for`](Self::class_for) can fail, because a decoded code may have no
/// class on this architecture.
///
/// ### Examples
/// ```rust
/// # use mmu_addresses::*;
/// const TABLE: PageSizeTable = PageSizeTable::new("PageSZ", &[
///     PageSizeEntry::new(0, PageSizeClass::Size4K, "4 Ko"),
///     PageSizeEntry::new(2, PageSizeClass::Size2M, "2 Mo"),
/// ]);
/// assert_eq!(TABLE.class_for(2), Ok(PageSizeClass::Size2M));
/// assert_eq!(TABLE.shift_for(PageSizeClass::Size2M), 21);
/// assert_eq!(TABLE.label_for(PageSizeClass::Size2M), "2 Mo");
/// assert_eq!(TABLE.label_for(PageSizeClass::Size64K), "64K");
/// assert!(TABLE.class_for(1).is_err());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PageSizeTable {
    field: &'static str,
    entries: &'static [PageSizeEntry],
}

impl PageSizeTable {
    /// `field` names the decoded field the codes come from (for errors).
    #[must_use]
    pub const fn new(field: &'static str, entries: &'static [PageSizeEntry]) -> Self {
        Self { field, entries }
    }

    #[inline]
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[inline]
    #[must_use]
    pub const fn entries(&self) -> &'static [PageSizeEntry] {
        self.entries
    }

    /// The class encoded by `code`.
    ///
    /// # Errors
    /// [`UnknownEnumValue`] if no row has this code.
    pub fn class_for(&self, code: u64) -> Result<PageSizeClass, UnknownEnumValue> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.class)
            .ok_or(UnknownEnumValue {
                field: self.field,
                value: code,
            })
    }

    #[inline]
    #[must_use]
    pub const fn shift_for(&self, class: PageSizeClass) -> u8 {
        class.shift()
    }

    #[must_use]
    pub fn label_for(&self, class: PageSizeClass) -> &'static str {
        self.entries
            .iter()
            .find(|e| e.class == class)
            .map_or(class.as_str(), |e| e.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_and_masks() {
        assert_eq!(PageSizeClass::Size4K.shift(), 12);
        assert_eq!(PageSizeClass::Size64K.shift(), 16);
        assert_eq!(PageSizeClass::Size2M.shift(), 21);
        assert_eq!(PageSizeClass::Size512M.shift(), 29);
        assert_eq!(PageSizeClass::Size2M.offset_mask(), 0x1f_ffff);
        assert_eq!(PageSizeClass::Size512M.size(), 512 * 1024 * 1024);
    }

    #[test]
    fn from_shift_is_inverse_of_shift() {
        for class in PageSizeClass::ALL {
            assert_eq!(PageSizeClass::from_shift(class.shift()), Some(class));
        }
        assert_eq!(PageSizeClass::from_shift(13), None);
    }

    #[test]
    fn unknown_code_is_reported() {
        const TABLE: PageSizeTable = PageSizeTable::new(
            "PageSZ",
            &[PageSizeEntry::new(0, PageSizeClass::Size4K, "4 Ko")],
        );
        assert_eq!(
            TABLE.class_for(3),
            Err(UnknownEnumValue {
                field: "PageSZ",
                value: 3
            })
        );
    }
}
