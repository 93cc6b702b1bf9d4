use crate::reader::{MemoryReader, UnreadableMemory};
use core::iter::FusedIterator;
use mmu_addresses::VirtualAddress;

/// Size in bytes of one table entry.
pub const ENTRY_SIZE: u64 = 8;

/// A nonzero entry of a table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TableEntry {
    /// Entry number within its table (not a byte offset).
    pub index: usize,
    pub raw: u64,
}

/// Lazy scan over the nonzero entries of one table.
///
/// Each call to [`next`](Iterator::next) reads words until it finds a nonzero
/// one. A failed read is yielded once and ends the scan. Nothing is cached:
/// scanning the same table again reads it again.
pub struct Entries<'r, R: ?Sized> {
    reader: &'r R,
    base: VirtualAddress,
    next: usize,
    count: usize,
    failed: bool,
}

impl<'r, R: MemoryReader + ?Sized> Entries<'r, R> {
    pub(crate) const fn new(reader: &'r R, base: VirtualAddress, count: usize) -> Self {
        Self {
            reader,
            base,
            next: 0,
            count,
            failed: false,
        }
    }
}

impl<R: MemoryReader + ?Sized> Iterator for Entries<'_, R> {
    type Item = Result<TableEntry, UnreadableMemory>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.next < self.count {
            let index = self.next;
            self.next += 1;

            let address = self.base + index as u64 * ENTRY_SIZE;
            match self.reader.read_u64(address) {
                Ok(0) => {}
                Ok(raw) => {
                    log::trace!("{address}: entry [{index}] = {raw:#018x}");
                    return Some(Ok(TableEntry { index, raw }));
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.count - self.next))
        }
    }
}

impl<R: MemoryReader + ?Sized> FusedIterator for Entries<'_, R> {}
