//! # Declarative Bitfield Decoding
//!
//! Hardware words (page-table entries, TLB registers) are described as data
//! instead of code: a [`Layout`] is a validated list of [`FieldSpec`]s, and
//! decoding a word yields a [`DecodedWord`] mapping field names to values.
//!
//! ```text
//!  63        23 22     13 12  11..10  9   8   7   6   5   4  3..2  1   0
//! +------------+---------+---+-------+---+---+---+---+---+---+----+---+---+
//! |    PFN     | Unused  | S | PageSZ| H | G | X | W | R | D | CP | A | P |
//! +------------+---------+---+-------+---+---+---+---+---+---+----+---+---+
//!                                   ▼
//!        [ FieldSpec("P", 0, 1), FieldSpec("A", 1, 1), FieldSpec("CP", 2, 2), … ]
//! ```
//!
//! ## What you get
//! - [`FieldSpec`]: one named bit range, usable in `const` tables.
//! - [`Layout`]: an ordered, non-overlapping set of fields, validated once at
//!   construction ([`LayoutError`]); decoding itself cannot fail.
//! - [`DecodedWord`]: the extracted values; lookups by name, listing of the nonzero fields.
//! - [`ValueLabels`]: code → label tables for enumerated sub-fields, with
//!   [`UnknownEnumValue`] for codes that have no label.
//!
//! Extraction is always unsigned: `(raw >> offset) & (2^width - 1)`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod decoded;
mod field;
mod labels;
mod layout;

pub use crate::decoded::DecodedWord;
pub use crate::field::FieldSpec;
pub use crate::labels::{Labelled, UnknownEnumValue, ValueLabels};
pub use crate::layout::{EncodeError, Layout, LayoutError};
