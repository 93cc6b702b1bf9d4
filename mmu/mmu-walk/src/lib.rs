//! # Page-Table Walking
//!
//! Architecture-independent reconstruction of a three-level radix-trie page
//! table from outside the running target. Memory is only ever *read*, through
//! a caller-supplied [`MemoryReader`]; the table shape comes from a
//! [`Geometry`].
//!
//! ## Virtual Address → Physical Address Walk
//!
//! A virtual address is split, least-significant bits first, into the in-page
//! offset and one index per level. On KVX (4 KiB pages, 40-bit VAs):
//!
//! ```text
//! | 63‒40     | 39‒30 | 29‒21 | 20‒12 | 11‒0   |
//! | sign ext. |  PGD  |  PMD  |  PTE  | Offset |
//! ```
//!
//! ```text
//!  PGD  →  PMD  →  PTE  →  Physical Page
//!   │       │       │
//!   │       │       └───► leaf: maps a base (or 64 KiB) page
//!   │       └───────────► huge flag set → leaf: maps a 2 MiB (or 512 MiB) page
//!   └───────────────────► pointer to a PMD table
//! ```
//!
//! Every table holds `1 << bits` entries of 8 bytes. A zero entry is "not
//! present". Directory entries hold the *physical* base of the next table;
//! the walker adds [`Geometry::phys_to_virt_offset`] to obtain an address
//! the reader can access.
//!
//! ## What you get
//! - [`TableWalker::enumerate`]: lazy listing of the nonzero entries of one table.
//! - [`TableWalker::dump`]: the whole tree as ordered maps ([`Dump`]).
//! - [`TableWalker::resolve`]: a single translation ([`TranslationResult`]).
//!
//! ## Consistency
//!
//! Reads are not transactional. Walking a live target may observe a tree
//! that changes between levels; results then mix old and new entries.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod dump;
mod geometry;
mod level;
mod reader;
mod resolve;
mod split;
mod table;
mod walker;

pub use crate::dump::{BranchFault, Dump, PgdNode, PmdNode, PteLeaf, PteTable};
pub use crate::geometry::{Geometry, GeometryConfig, GeometryError};
pub use crate::level::Level;
pub use crate::reader::{MemoryReader, UnreadableMemory};
pub use crate::resolve::{ResolveError, TranslationResult};
pub use crate::split::SplitAddress;
pub use crate::table::{ENTRY_SIZE, Entries, TableEntry};
pub use crate::walker::TableWalker;
