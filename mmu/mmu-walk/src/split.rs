use crate::geometry::Geometry;
use crate::level::Level;
use mmu_addresses::VirtualAddress;

/// A virtual address broken into per-level table indices.
///
/// Bits above the PGD index are kept verbatim in `sign_extension`; they are
/// not checked against any canonical-address rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SplitAddress {
    pub address: VirtualAddress,
    pub pgd_index: usize,
    pub pmd_index: usize,
    pub pte_index: usize,
    pub page_offset: u64,
    pub sign_extension: u64,
}

impl SplitAddress {
    pub(crate) fn new(address: VirtualAddress, geometry: &Geometry) -> Self {
        let raw = address.as_u64();
        Self {
            address,
            pgd_index: index(raw, geometry, Level::Pgd),
            pmd_index: index(raw, geometry, Level::Pmd),
            pte_index: index(raw, geometry, Level::Pte),
            page_offset: raw & low_mask(geometry.page_shift()),
            sign_extension: raw.checked_shr(u32::from(geometry.address_bits())).unwrap_or(0),
        }
    }

    /// Index into the table at `level`.
    #[must_use]
    pub const fn index(&self, level: Level) -> usize {
        match level {
            Level::Pgd => self.pgd_index,
            Level::Pmd => self.pmd_index,
            Level::Pte => self.pte_index,
        }
    }

    /// Reassemble the address from its parts.
    #[must_use]
    pub fn join(&self, geometry: &Geometry) -> VirtualAddress {
        let mut raw = self.page_offset & low_mask(geometry.page_shift());
        for level in Level::ALL {
            let index = self.index(level) as u64 & low_mask(geometry.bits(level));
            raw |= index << geometry.index_shift(level);
        }
        raw |= self
            .sign_extension
            .checked_shl(u32::from(geometry.address_bits()))
            .unwrap_or(0);
        VirtualAddress::new(raw)
    }
}

/// Mask of the `bits` lowest bits.
fn low_mask(bits: u8) -> u64 {
    1u64.checked_shl(u32::from(bits)).map_or(u64::MAX, |bit| bit - 1)
}

#[allow(clippy::cast_possible_truncation)]
fn index(raw: u64, geometry: &Geometry, level: Level) -> usize {
    ((raw >> geometry.index_shift(level)) & low_mask(geometry.bits(level))) as usize
}
