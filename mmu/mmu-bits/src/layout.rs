//! # Layouts
//!
//! A [`Layout`] is a validated, ordered set of [`FieldSpec`]s describing one
//! hardware word format (a page-table entry, a TLB register, ...).

use crate::decoded::DecodedWord;
use crate::field::FieldSpec;
use alloc::vec::Vec;

/// Why a set of field specifications cannot form a [`Layout`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout `{layout}`: field `{field}` has zero width")]
    ZeroWidth {
        layout: &'static str,
        field: &'static str,
    },
    #[error("layout `{layout}`: field `{field}` (offset {offset}, width {width}) exceeds 64 bits")]
    OutOfRange {
        layout: &'static str,
        field: &'static str,
        offset: u8,
        width: u8,
    },
    #[error("layout `{layout}`: fields `{first}` and `{second}` overlap")]
    Overlap {
        layout: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("layout `{layout}`: field name `{field}` is used twice")]
    DuplicateName {
        layout: &'static str,
        field: &'static str,
    },
}

/// Why a set of field values cannot be encoded into a word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("layout `{layout}` has no field named `{field}`")]
    UnknownField {
        layout: &'static str,
        field: &'static str,
    },
    #[error("value {value:#x} does not fit in field `{field}` ({width} bits)")]
    ValueOutOfRange {
        field: &'static str,
        width: u8,
        value: u64,
    },
}

/// A validated description of a 64-bit word.
///
/// Validation happens once, in [`Layout::new`]:
/// - every field is 1..=64 bits wide and ends at or below bit 64,
/// - no two fields overlap (so at most 64 bits are consumed),
/// - field names are unique.
///
/// Bits not covered by any field are padding and are ignored by
/// [`decode`](Self::decode).
///
/// ### Examples
/// ```rust
/// # use mmu_bits::{FieldSpec, Layout};
/// const FIELDS: &[FieldSpec] = &[
///     FieldSpec::flag("P", 0),
///     FieldSpec::new("CP", 2, 2),
///     FieldSpec::new("PFN", 12, 40),
/// ];
/// let layout = Layout::new("demo", FIELDS).unwrap();
/// let word = layout.decode(0x0000_0000_0012_3009);
/// assert_eq!(word.get("P"), Some(1));
/// assert_eq!(word.get("CP"), Some(2));
/// assert_eq!(word.get("PFN"), Some(0x123));
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    name: &'static str,
    fields: &'static [FieldSpec],
}

impl Layout {
    /// Validate `fields` and build a layout.
    ///
    /// # Errors
    /// Returns the first [`LayoutError`] found, in field order.
    pub const fn new(
        name: &'static str,
        fields: &'static [FieldSpec],
    ) -> Result<Self, LayoutError> {
        let mut i = 0;
        while i < fields.len() {
            let field = &fields[i];
            if field.width() == 0 {
                return Err(LayoutError::ZeroWidth {
                    layout: name,
                    field: field.name(),
                });
            }
            if field.end() > 64 {
                return Err(LayoutError::OutOfRange {
                    layout: name,
                    field: field.name(),
                    offset: field.offset(),
                    width: field.width(),
                });
            }

            let mut j = 0;
            while j < i {
                let other = &fields[j];
                if str_eq(other.name(), field.name()) {
                    return Err(LayoutError::DuplicateName {
                        layout: name,
                        field: field.name(),
                    });
                }
                if other.overlaps(field) {
                    return Err(LayoutError::Overlap {
                        layout: name,
                        first: other.name(),
                        second: field.name(),
                    });
                }
                j += 1;
            }
            i += 1;
        }

        Ok(Self { name, fields })
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    #[inline]
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldSpec> {
        self.fields.iter().copied().find(|f| f.name() == name)
    }

    /// Union of all field masks; the complement is padding.
    #[must_use]
    pub const fn used_bits(&self) -> u64 {
        let mut bits = 0;
        let mut i = 0;
        while i < self.fields.len() {
            bits |= self.fields[i].mask();
            i += 1;
        }
        bits
    }

    /// Decode `raw` into its named fields. Pure and infallible.
    #[must_use]
    pub fn decode(&self, raw: u64) -> DecodedWord {
        let values = self
            .fields
            .iter()
            .map(|field| (*field, field.extract(raw)))
            .collect::<Vec<_>>();
        DecodedWord::new(self.name, raw, values)
    }

    /// Build a word from `(name, value)` pairs; unnamed fields and padding are zero.
    ///
    /// # Errors
    /// - [`EncodeError::UnknownField`] if a name is not part of the layout.
    /// - [`EncodeError::ValueOutOfRange`] if a value is wider than its field.
    pub fn encode<I>(&self, values: I) -> Result<u64, EncodeError>
    where
        I: IntoIterator<Item = (&'static str, u64)>,
    {
        values.into_iter().try_fold(0u64, |raw, (name, value)| {
            let field = self
                .fields
                .iter()
                .find(|f| f.name() == name)
                .ok_or_else(|| EncodeError::UnknownField {
                    layout: self.name,
                    field: name,
                })?;

            if !field.fits(value) {
                return Err(EncodeError::ValueOutOfRange {
                    field: field.name(),
                    width: field.width(),
                    value,
                });
            }

            Ok(field.insert(raw, value))
        })
    }

    /// Re-encode a decoded word. Only bits covered by the layout survive.
    #[must_use]
    pub fn reencode(&self, word: &DecodedWord) -> u64 {
        word.fields()
            .fold(0u64, |raw, (field, value)| field.insert(raw, value))
    }
}

/// `const` string equality.
const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const PTE: &[FieldSpec] = &[
        FieldSpec::flag("P", 0),
        FieldSpec::flag("A", 1),
        FieldSpec::new("CP", 2, 2),
        FieldSpec::new("PageSZ", 10, 2),
        FieldSpec::new("PFN", 23, 41),
    ];

    #[test]
    fn valid_layout() {
        let layout = Layout::new("pte", PTE).expect("valid");
        assert_eq!(layout.fields().len(), 5);
        assert_eq!(layout.field("CP"), Some(FieldSpec::new("CP", 2, 2)));
        assert_eq!(layout.field("nope"), None);
    }

    #[test]
    fn overlap_rejected() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::new("a", 0, 4), FieldSpec::new("b", 3, 1)];
        assert_eq!(
            Layout::new("bad", FIELDS),
            Err(LayoutError::Overlap {
                layout: "bad",
                first: "a",
                second: "b"
            })
        );
    }

    #[test]
    fn out_of_range_rejected() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::new("hi", 60, 5)];
        assert!(matches!(
            Layout::new("bad", FIELDS),
            Err(LayoutError::OutOfRange { field: "hi", .. })
        ));
    }

    #[test]
    fn zero_width_rejected() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::new("z", 3, 0)];
        assert!(matches!(
            Layout::new("bad", FIELDS),
            Err(LayoutError::ZeroWidth { field: "z", .. })
        ));
    }

    #[test]
    fn duplicate_rejected() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::flag("x", 0), FieldSpec::flag("x", 1)];
        assert!(matches!(
            Layout::new("bad", FIELDS),
            Err(LayoutError::DuplicateName { field: "x", .. })
        ));
    }

    #[test]
    fn full_width_field_is_valid() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::new("raw", 0, 64)];
        let layout = Layout::new("raw", FIELDS).expect("valid");
        assert_eq!(layout.decode(u64::MAX).get("raw"), Some(u64::MAX));
        assert_eq!(layout.used_bits(), u64::MAX);
    }

    #[test]
    fn decode_is_pure() {
        let layout = Layout::new("pte", PTE).expect("valid");
        let raw = 0x0000_0000_0080_0c0d;
        assert_eq!(layout.decode(raw), layout.decode(raw));
    }

    #[test]
    fn decoded_fields_reconstruct_consumed_bits() {
        let layout = Layout::new("pte", PTE).expect("valid");
        for raw in [0u64, u64::MAX, 0x1234_5678_9abc_def0, 0x8000_0000_0000_0c03] {
            let rebuilt = layout
                .decode(raw)
                .fields()
                .fold(0u64, |acc, (field, value)| acc | (value << field.offset()));
            assert_eq!(rebuilt, raw & layout.used_bits());
            assert_eq!(layout.reencode(&layout.decode(raw)), rebuilt);
        }
    }

    #[test]
    fn encode_builds_words() {
        let layout = Layout::new("pte", PTE).expect("valid");
        let raw = layout
            .encode([("P", 1), ("PageSZ", 2), ("PFN", 0x80)])
            .expect("encode");
        assert_eq!(raw, 1 | (2 << 10) | (0x80 << 23));
    }

    #[test]
    fn encode_rejects_wide_values() {
        let layout = Layout::new("pte", PTE).expect("valid");
        assert_eq!(
            layout.encode([("CP", 4)]),
            Err(EncodeError::ValueOutOfRange {
                field: "CP",
                width: 2,
                value: 4
            })
        );
    }

    #[test]
    fn encode_rejects_unknown_fields() {
        let layout = Layout::new("pte", PTE).expect("valid");
        assert!(matches!(
            layout.encode([("Q", 1)]),
            Err(EncodeError::UnknownField {
                layout: "pte",
                field: "Q"
            })
        ));
    }
}
