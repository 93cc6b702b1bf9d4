//! # Architecture Tables
//!
//! Static configuration for the supported MMUs: page-table geometries, leaf
//! layouts, TLB register layouts and their label tables.
//!
//! | Arch | Levels | Huge pages | Directory entries |
//! |------|--------|------------|-------------------|
//! | [`Arch::Kvx`] | 10 / 9 / 9 bits, 4 KiB | 2 MiB at PMD (`H`, bit 9) | physical, linear map at `0xffff_ff00_0000_0000` |
//! | [`Arch::K1c`] | 9 / 9 / 9 bits, 4 KiB | none | directly readable |
//!
//! ```rust
//! # use mmu_arch::Arch;
//! let arch: Arch = "kvx".parse()?;
//! let geometry = arch.geometry()?;
//! assert_eq!(geometry.address_bits(), 40);
//!
//! let tlb = arch.tlb()?;
//! let entry = tlb.decode(0x0000_0000_8000_0091, 0x0000_0000_4000_0200);
//! assert_eq!(tlb.render("es", entry.tel.get("es").unwrap_or(0)).to_string(), "Present");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(test), no_std)]

pub mod k1c;
pub mod kvx;
pub mod labels;
mod tlb;

pub(crate) use crate::tlb::TlbConfig;
pub use crate::tlb::{FieldValue, Tlb, TlbEntry};

use core::fmt;
use core::str::FromStr;
use mmu_bits::LayoutError;
use mmu_walk::{Geometry, GeometryError};

/// A supported MMU.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Arch {
    #[default]
    Kvx,
    K1c,
}

/// The name given to [`Arch::from_str`] is not a supported architecture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown architecture (expected one of: kvx, k1c)")]
pub struct UnknownArch;

impl Arch {
    pub const ALL: [Self; 2] = [Self::Kvx, Self::K1c];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kvx => "kvx",
            Self::K1c => "k1c",
        }
    }

    /// The validated page-table geometry.
    ///
    /// # Errors
    /// [`GeometryError`] if the built-in tables are inconsistent.
    pub fn geometry(self) -> Result<Geometry, GeometryError> {
        let config = match self {
            Self::Kvx => kvx::GEOMETRY,
            Self::K1c => k1c::GEOMETRY,
        };
        let geometry = Geometry::new(config)?;
        log::debug!(
            "{self}: {}/{}/{} index bits, {} page, tables at +{:#x}",
            geometry.bits(mmu_walk::Level::Pgd),
            geometry.bits(mmu_walk::Level::Pmd),
            geometry.bits(mmu_walk::Level::Pte),
            geometry.base_page(),
            geometry.phys_to_virt_offset()
        );
        Ok(geometry)
    }

    /// The validated TLB register layouts.
    ///
    /// # Errors
    /// [`LayoutError`] if the built-in layouts are inconsistent.
    pub const fn tlb(self) -> Result<Tlb, LayoutError> {
        Tlb::new(match self {
            Self::Kvx => kvx::TLB,
            Self::K1c => k1c::TLB,
        })
    }

    /// Leaf fields left out of the summary of nonzero fields of a PTE.
    #[must_use]
    pub const fn hidden_leaf_fields(self) -> &'static [&'static str] {
        match self {
            Self::Kvx => kvx::PTE_HIDDEN,
            Self::K1c => k1c::PTE_HIDDEN,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = UnknownArch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownArch)
    }
}
