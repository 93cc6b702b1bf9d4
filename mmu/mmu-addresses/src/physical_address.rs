use crate::{MemoryAddress, PageSizeClass, VirtualAddress};
use core::fmt;

/// Physical memory address.
///
/// A thin wrapper around [`MemoryAddress`] that denotes **physical**
/// addresses: frame bases computed from a PFN, and the next-level table
/// pointers stored in directory entries. A debugger usually cannot read a
/// physical address directly; convert it with
/// [`to_virtual`](Self::to_virtual) using the architecture's linear-map
/// offset first.
///
/// ### Examples
/// ```rust
/// # use mmu_addresses::*;
/// let pa = PhysicalAddress::new(0x0000_0000_0010_2000);
/// let va = pa.to_virtual(0xffff_ff00_0000_0000);
/// assert_eq!(va.as_u64(), 0xffff_ff00_0010_2000);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(MemoryAddress);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(MemoryAddress::new(v))
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0.as_u64()
    }

    #[inline]
    #[must_use]
    pub const fn as_addr(self) -> MemoryAddress {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn offset_in(self, size: PageSizeClass) -> u64 {
        self.0.offset_in(size)
    }

    /// The address at which this physical address is visible through a
    /// linear map placed `pa_to_va_offset` bytes above physical memory.
    #[inline]
    #[must_use]
    pub const fn to_virtual(self, pa_to_va_offset: u64) -> VirtualAddress {
        VirtualAddress::new(self.as_u64().wrapping_add(pa_to_va_offset))
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016x})", self.as_u64())
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.as_u64(), f)
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u64 {
    #[inline]
    fn from(pa: PhysicalAddress) -> Self {
        pa.as_u64()
    }
}
