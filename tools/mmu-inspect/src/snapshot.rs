//! Memory captured from a stopped target, one raw file per region.

use crate::args::RegionArg;
use mmu_addresses::VirtualAddress;
use mmu_walk::{MemoryReader, UnreadableMemory};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("region at {address} overlaps the region at {other}")]
    Overlap {
        address: VirtualAddress,
        other: VirtualAddress,
    },
    #[error("region at {address} wraps past the end of the address space")]
    Wraps { address: VirtualAddress },
}

/// A contiguous range of target memory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    base: u64,
    bytes: Vec<u8>,
}

impl Region {
    /// One past the last byte.
    fn end(&self) -> u64 {
        self.base + self.bytes.len() as u64
    }

    fn slice(&self, address: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(address.checked_sub(self.base)?).ok()?;
        self.bytes.get(start..start.checked_add(len)?)
    }
}

/// Target memory as a set of non-overlapping regions, sorted by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    regions: Vec<Region>,
}

impl Snapshot {
    /// Load every `--region` file.
    pub fn load(args: &[RegionArg]) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::default();
        for arg in args {
            let bytes = std::fs::read(&arg.path).map_err(|source| SnapshotError::Io {
                path: arg.path.clone(),
                source,
            })?;
            log::debug!(
                "{}: {} bytes at {}",
                arg.path.display(),
                bytes.len(),
                VirtualAddress::new(arg.address)
            );
            snapshot.insert(arg.address, bytes)?;
        }
        log::info!(
            "snapshot: {} bytes in {} regions",
            snapshot.byte_count(),
            snapshot.regions.len()
        );
        Ok(snapshot)
    }

    pub fn insert(&mut self, base: u64, bytes: Vec<u8>) -> Result<(), SnapshotError> {
        let address = VirtualAddress::new(base);
        if base.checked_add(bytes.len() as u64).is_none() {
            return Err(SnapshotError::Wraps { address });
        }
        let region = Region { base, bytes };
        if let Some(other) = self
            .regions
            .iter()
            .find(|other| region.base < other.end() && other.base < region.end())
        {
            return Err(SnapshotError::Overlap {
                address,
                other: VirtualAddress::new(other.base),
            });
        }

        let at = self.regions.partition_point(|other| other.base < base);
        self.regions.insert(at, region);
        Ok(())
    }

    /// Total number of captured bytes.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.regions.iter().map(|region| region.bytes.len()).sum()
    }
}

impl MemoryReader for Snapshot {
    /// A read succeeds only if it lies entirely within one region.
    fn read(&self, address: VirtualAddress, buf: &mut [u8]) -> Result<(), UnreadableMemory> {
        let at = self
            .regions
            .partition_point(|region| region.base <= address.as_u64());
        let bytes = at
            .checked_sub(1)
            .and_then(|i| self.regions[i].slice(address.as_u64(), buf.len()))
            .ok_or(UnreadableMemory { address })?;
        buf.copy_from_slice(bytes);
        Ok(())
    }
}
