use mmu_addresses::VirtualAddress;

/// The reader could not supply the requested bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot read memory at {address}")]
pub struct UnreadableMemory {
    pub address: VirtualAddress,
}

/// Read access to the target's memory.
///
/// Implementations fill `buf` completely or fail. The walker never writes
/// memory and never retries a failed read.
///
/// Any `Fn(VirtualAddress, &mut [u8]) -> Result<(), UnreadableMemory>`
/// closure is a reader:
///
/// ```rust
/// # use mmu_walk::{MemoryReader, UnreadableMemory};
/// # use mmu_addresses::VirtualAddress;
/// let zeroes = |_: VirtualAddress, buf: &mut [u8]| -> Result<(), UnreadableMemory> {
///     buf.fill(0);
///     Ok(())
/// };
/// assert_eq!(zeroes.read_u64(VirtualAddress::new(0x1000)), Ok(0));
/// ```
pub trait MemoryReader {
    /// Fill `buf` with the bytes at `address`.
    ///
    /// # Errors
    /// [`UnreadableMemory`] if any byte of the range is inaccessible.
    fn read(&self, address: VirtualAddress, buf: &mut [u8]) -> Result<(), UnreadableMemory>;

    /// Read one little-endian 64-bit word.
    ///
    /// # Errors
    /// Propagates [`read`](Self::read) failures.
    fn read_u64(&self, address: VirtualAddress) -> Result<u64, UnreadableMemory> {
        let mut bytes = [0u8; 8];
        self.read(address, &mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }
}

impl<F> MemoryReader for F
where
    F: Fn(VirtualAddress, &mut [u8]) -> Result<(), UnreadableMemory>,
{
    fn read(&self, address: VirtualAddress, buf: &mut [u8]) -> Result<(), UnreadableMemory> {
        self(address, buf)
    }
}
