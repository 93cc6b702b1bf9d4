//! # Field Specifications
//!
//! A [`FieldSpec`] names a contiguous bit range inside a 64-bit word.

use core::fmt;

/// A named bit range `[offset, offset + width)` within a 64-bit word.
///
/// `FieldSpec` values are plain data and can be built in `const` context.
/// They are only checked for consistency once they become part of a
/// [`Layout`](crate::Layout); the accessors below are total and never panic,
/// even for out-of-range specs (bits beyond 63 simply read as zero).
///
/// ### Examples
/// ```rust
/// # use mmu_bits::FieldSpec;
/// let cp = FieldSpec::new("CP", 2, 2);
/// assert_eq!(cp.mask(), 0b1100);
/// assert_eq!(cp.extract(0b1011), 0b10);
/// assert_eq!(cp.insert(0, 0b11), 0b1100);
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FieldSpec {
    name: &'static str,
    offset: u8,
    width: u8,
}

impl FieldSpec {
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, offset: u8, width: u8) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// A single-bit field at `bit`.
    #[inline]
    #[must_use]
    pub const fn flag(name: &'static str, bit: u8) -> Self {
        Self::new(name, bit, 1)
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Position of the least-significant bit of the field.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    /// Number of bits in the field.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// One past the most-significant bit of the field.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.offset as u32 + self.width as u32
    }

    /// Whether this is a one-bit flag.
    #[inline]
    #[must_use]
    pub const fn is_flag(&self) -> bool {
        self.width == 1
    }

    /// Mask of the field value *before* shifting into place (`2^width - 1`).
    #[inline]
    #[must_use]
    pub const fn value_mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Mask of the field bits in place.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> u64 {
        match self.value_mask().checked_shl(self.offset as u32) {
            Some(mask) if self.offset < 64 => mask,
            _ => 0,
        }
    }

    /// Extract the field from `raw`; always `< 2^width`.
    #[inline]
    #[must_use]
    pub const fn extract(&self, raw: u64) -> u64 {
        match raw.checked_shr(self.offset as u32) {
            Some(shifted) => shifted & self.value_mask(),
            None => 0,
        }
    }

    /// Whether any bit of the field is set in `raw`.
    #[inline]
    #[must_use]
    pub const fn is_set(&self, raw: u64) -> bool {
        raw & self.mask() != 0
    }

    /// Replace the field in `raw` with `value`, truncated to the field width.
    #[inline]
    #[must_use]
    pub const fn insert(&self, raw: u64, value: u64) -> u64 {
        let placed = match (value & self.value_mask()).checked_shl(self.offset as u32) {
            Some(placed) if self.offset < 64 => placed,
            _ => 0,
        };
        (raw & !self.mask()) | placed
    }

    /// Whether `value` fits in the field without truncation.
    #[inline]
    #[must_use]
    pub const fn fits(&self, value: u64) -> bool {
        value & !self.value_mask() == 0
    }

    /// Whether the bit ranges of `self` and `other` share at least one bit.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        (self.offset as u32) < other.end() && (other.offset as u32) < self.end()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 1 {
            write!(f, "{}[{}]", self.name, self.offset)
        } else {
            write!(
                f,
                "{}[{}..={}]",
                self.name,
                self.offset,
                self.end().saturating_sub(1)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(FieldSpec::flag("P", 0).mask(), 1);
        assert_eq!(FieldSpec::new("PFN", 23, 41).mask(), !((1u64 << 23) - 1));
        assert_eq!(FieldSpec::new("all", 0, 64).mask(), u64::MAX);
        assert_eq!(FieldSpec::new("all", 0, 64).value_mask(), u64::MAX);
    }

    #[test]
    fn extract_is_bounded_by_width() {
        let raw = 0xdead_beef_cafe_f00d;
        for offset in 0..64u8 {
            for width in 1..=(64 - offset) {
                let field = FieldSpec::new("f", offset, width);
                let value = field.extract(raw);
                assert!(width == 64 || value < (1u64 << width));
            }
        }
    }

    #[test]
    fn insert_then_extract() {
        let field = FieldSpec::new("PageSZ", 10, 2);
        let raw = field.insert(u64::MAX, 0b01);
        assert_eq!(field.extract(raw), 0b01);
        assert_eq!(raw | field.mask(), u64::MAX);
    }

    #[test]
    fn out_of_range_reads_zero() {
        let field = FieldSpec::new("oob", 70, 3);
        assert_eq!(field.mask(), 0);
        assert_eq!(field.extract(u64::MAX), 0);
        assert_eq!(field.insert(5, 7), 5);
    }

    #[test]
    fn overlap_detection() {
        let a = FieldSpec::new("a", 0, 4);
        let b = FieldSpec::new("b", 3, 2);
        let c = FieldSpec::new("c", 4, 2);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", FieldSpec::flag("H", 9)), "H[9]");
        assert_eq!(format!("{:?}", FieldSpec::new("CP", 2, 2)), "CP[2..=3]");
    }
}
