//! # Value Labels
//!
//! Enumerated sub-fields (cache policy, protection attributes, page size
//! codes, ...) are extracted as plain integers. A [`ValueLabels`] table gives
//! each known code a display name.

use core::fmt;

/// A decoded field value that has no label in its table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value {value:#x} for field `{field}`")]
pub struct UnknownEnumValue {
    pub field: &'static str,
    pub value: u64,
}

/// Code → label table for one field.
///
/// ### Examples
/// ```rust
/// # use mmu_bits::ValueLabels;
/// const ES: ValueLabels = ValueLabels::new("es", &[(0, "Invalid"), (1, "Present")]);
/// assert_eq!(ES.label(1), Ok("Present"));
/// assert!(ES.label(3).is_err());
/// assert_eq!(ES.describe(3).to_string(), "unknown (3)");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ValueLabels {
    field: &'static str,
    labels: &'static [(u64, &'static str)],
}

impl ValueLabels {
    #[must_use]
    pub const fn new(field: &'static str, labels: &'static [(u64, &'static str)]) -> Self {
        Self { field, labels }
    }

    /// Name of the field this table applies to.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[inline]
    #[must_use]
    pub const fn entries(&self) -> &'static [(u64, &'static str)] {
        self.labels
    }

    /// The label of `value`.
    ///
    /// # Errors
    /// [`UnknownEnumValue`] if the table has no entry for `value`; callers
    /// must not substitute a default.
    pub fn label(&self, value: u64) -> Result<&'static str, UnknownEnumValue> {
        self.labels
            .iter()
            .find(|(code, _)| *code == value)
            .map(|&(_, label)| label)
            .ok_or(UnknownEnumValue {
                field: self.field,
                value,
            })
    }

    /// Label of `value`, falling back to the raw integer for display.
    #[must_use]
    pub fn describe(&self, value: u64) -> Labelled {
        self.label(value)
            .map_or(Labelled::Unknown(value), Labelled::Known)
    }
}

/// Result of [`ValueLabels::describe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Labelled {
    Known(&'static str),
    Unknown(u64),
}

impl fmt::Display for Labelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(label) => f.write_str(label),
            Self::Unknown(value) => write!(f, "unknown ({value})"),
        }
    }
}
