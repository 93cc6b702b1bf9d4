//! # Virtual and Physical Address Types
//!
//! Strongly typed wrappers for raw addresses seen while inspecting a target's
//! translation tables, and the closed set of page sizes its MMU supports.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MemoryAddress`] | A raw 64-bit address, either physical or virtual. |
//! | [`VirtualAddress`] | An address as the target's CPU (or a debugger) dereferences it. |
//! | [`PhysicalAddress`] | A frame address as stored in page-table entries. |
//! | [`PageSizeClass`] | One of the 4 KiB / 64 KiB / 2 MiB / 512 MiB page sizes. |
//! | [`PageSizeTable`] | Per-architecture mapping of hardware size codes to classes and labels. |
//!
//! Unlike a kernel, an inspector only learns the size of a mapping after
//! decoding its leaf entry, so page sizes are runtime values here rather than
//! type-level markers.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use mmu_addresses::*;
//! let va = VirtualAddress::new(0xffff_ff00_0020_1234);
//! assert_eq!(va.offset_in(PageSizeClass::Size4K), 0x234);
//! assert_eq!(va.offset_in(PageSizeClass::Size2M), 0x1234);
//! assert_eq!(va.align_down(PageSizeClass::Size64K).as_u64(), 0xffff_ff00_0020_0000);
//! ```
//!
//! ## Design Notes
//!
//! - The types are `#[repr(transparent)]` and implement `Copy`, `Eq`, `Ord`,
//!   and `Hash`, making them suitable as map keys.
//! - Display uses the lowercase, zero-padded 16-digit form `0x…` that existing
//!   tooling expects.

#![cfg_attr(not(test), no_std)]

mod memory_address;
mod page_size;
mod physical_address;
mod virtual_address;

pub use crate::memory_address::MemoryAddress;
pub use crate::page_size::{PageSizeClass, PageSizeEntry, PageSizeTable};
pub use crate::physical_address::PhysicalAddress;
pub use crate::virtual_address::VirtualAddress;
