//! # TLB Entries
//!
//! A TLB entry is read as two registers, `$tel` (low: frame, status,
//! protection) and `$teh` (high: page number, ASN). Both are decoded with the
//! same [`Layout`] machinery as page-table entries.

use core::fmt;
use mmu_bits::{DecodedWord, FieldSpec, Labelled, Layout, LayoutError, ValueLabels};

/// Static description of an architecture's TLB registers.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TlbConfig {
    pub tel: (&'static str, &'static [FieldSpec]),
    pub teh: (&'static str, &'static [FieldSpec]),
    /// Label tables, matched to fields by name.
    pub labels: &'static [ValueLabels],
    /// Fields rendered as zero-padded hexadecimal.
    pub hex: &'static [&'static str],
}

/// Validated TLB register layouts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tlb {
    tel: Layout,
    teh: Layout,
    labels: &'static [ValueLabels],
    hex: &'static [&'static str],
}

impl Tlb {
    pub(crate) const fn new(config: TlbConfig) -> Result<Self, LayoutError> {
        let tel = match Layout::new(config.tel.0, config.tel.1) {
            Ok(layout) => layout,
            Err(e) => return Err(e),
        };
        let teh = match Layout::new(config.teh.0, config.teh.1) {
            Ok(layout) => layout,
            Err(e) => return Err(e),
        };
        Ok(Self {
            tel,
            teh,
            labels: config.labels,
            hex: config.hex,
        })
    }

    #[must_use]
    pub const fn tel(&self) -> &Layout {
        &self.tel
    }

    #[must_use]
    pub const fn teh(&self) -> &Layout {
        &self.teh
    }

    /// The label table for a field, if it is enumerated.
    #[must_use]
    pub fn labels_for(&self, field: &str) -> Option<&'static ValueLabels> {
        self.labels.iter().find(|labels| labels.field() == field)
    }

    #[must_use]
    pub fn decode(&self, tel: u64, teh: u64) -> TlbEntry {
        TlbEntry {
            tel: self.tel.decode(tel),
            teh: self.teh.decode(teh),
        }
    }

    /// How a decoded field value is shown.
    #[must_use]
    pub fn render(&self, field: &str, value: u64) -> FieldValue {
        if let Some(labels) = self.labels_for(field) {
            FieldValue::Label(labels.describe(value))
        } else if self.hex.contains(&field) {
            FieldValue::Hex(value)
        } else {
            FieldValue::Decimal(value)
        }
    }
}

/// A decoded `$tel`/`$teh` pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TlbEntry {
    pub tel: DecodedWord,
    pub teh: DecodedWord,
}

/// Display form of a TLB field value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Label(Labelled),
    Hex(u64),
    Decimal(u64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => fmt::Display::fmt(label, f),
            Self::Hex(value) => write!(f, "0x{value:016x}"),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}
