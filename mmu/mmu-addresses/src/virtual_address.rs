use crate::{MemoryAddress, PageSizeClass};
use core::fmt;
use core::ops::Add;

/// Virtual memory address.
///
/// A thin wrapper around [`MemoryAddress`] that denotes addresses the target
/// dereferences through its translation tables, including the table bases a
/// debugger reads from. It does not validate canonicality; the high bits of a
/// virtual address are carried as-is.
///
/// ### Examples
/// ```rust
/// # use mmu_addresses::*;
/// let va = VirtualAddress::new(0x0000_0000_4020_1abc);
/// assert_eq!(va.offset_in(PageSizeClass::Size4K), 0xabc);
/// assert_eq!(va.align_down(PageSizeClass::Size4K).as_u64(), 0x4020_1000);
/// assert_eq!(va.to_string(), "0x0000000040201abc");
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(MemoryAddress);

impl VirtualAddress {
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

    #[inline]
    #[must_use]
    pub const fn align_down(self, size: PageSizeClass) -> Self {
        Self(self.0.align_down(size))
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_add(self, rhs: u64) -> Self {
        Self(self.0.wrapping_add(rhs))
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016x})", self.as_u64())
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.as_u64(), f)
    }
}

impl From<u64> for VirtualAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<VirtualAddress> for u64 {
    #[inline]
    fn from(va: VirtualAddress) -> Self {
        va.as_u64()
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        self.wrapping_add(rhs)
    }
}
