use crate::level::Level;
use crate::reader::UnreadableMemory;
use crate::split::SplitAddress;
use mmu_addresses::{PageSizeClass, PhysicalAddress, VirtualAddress};
use mmu_bits::{DecodedWord, UnknownEnumValue};

/// Outcome of a successful [`TableWalker::resolve`](crate::TableWalker::resolve).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranslationResult {
    pub virtual_address: SplitAddress,
    pub physical_address: PhysicalAddress,
    /// The decoded leaf entry.
    pub leaf: DecodedWord,
    /// [`Level::Pmd`] for huge pages, [`Level::Pte`] otherwise.
    pub level: Level,
    pub page_size: PageSizeClass,
}

/// Why an address could not be translated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The entry at `level` is zero; the address is not mapped.
    #[error("no {level} entry for address {address}")]
    TranslationFault {
        level: Level,
        address: VirtualAddress,
    },
    #[error(transparent)]
    Unreadable(#[from] UnreadableMemory),
    /// The leaf's page-size code has no class.
    #[error(transparent)]
    UnknownPageSize(#[from] UnknownEnumValue),
}

impl ResolveError {
    /// `true` for an unmapped address, as opposed to a failure to look.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::TranslationFault { .. })
    }
}
