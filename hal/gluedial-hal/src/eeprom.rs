//! Persistent byte region abstractions
//!
//! Models a small EEPROM-like region: reads and writes go to a working
//! copy addressed by byte offset, and `commit` makes the working copy
//! durable. Boards without real EEPROM emulate it in a flash sector.

/// Errors from persistent storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Access outside the region
    OutOfBounds,
    /// Underlying flash/EEPROM operation failed
    Flash,
    /// Storage has not been initialized
    NotReady,
}

/// Addressable persistent byte region
///
/// Writes are not durable until [`ByteStore::commit`] returns `Ok`.
/// Implementations are not required to make `commit` atomic: a power loss
/// in the middle of a commit may leave the region partially written.
pub trait ByteStore {
    /// Size of the region in bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `address`
    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<(), StoreError>;

    /// Write `data` starting at `address` into the working copy
    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError>;

    /// Flush the working copy to the persistent medium
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// Typed get/put helpers over a [`ByteStore`]
///
/// All values are little-endian.
pub trait ByteStoreExt: ByteStore {
    /// Read a little-endian `i32`
    fn get_i32(&mut self, address: usize) -> Result<i32, StoreError> {
        let mut buf = [0u8; 4];
        self.read(address, &mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Write a little-endian `i32`
    fn put_i32(&mut self, address: usize, value: i32) -> Result<(), StoreError> {
        self.write(address, &value.to_le_bytes())
    }

    /// Read a little-endian `u32`
    fn get_u32(&mut self, address: usize) -> Result<u32, StoreError> {
        let mut buf = [0u8; 4];
        self.read(address, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Write a little-endian `u32`
    fn put_u32(&mut self, address: usize, value: u32) -> Result<(), StoreError> {
        self.write(address, &value.to_le_bytes())
    }
}

// Blanket implementation for all ByteStore types
impl<T: ByteStore> ByteStoreExt for T {}

/// Check that `len` bytes at `address` fit in a region of `capacity` bytes
///
/// Helper for implementations.
pub fn check_range(capacity: usize, address: usize, len: usize) -> Result<(), StoreError> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StoreError::OutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert_eq!(check_range(16, 0, 16), Ok(()));
        assert_eq!(check_range(16, 12, 4), Ok(()));
        assert_eq!(check_range(16, 13, 4), Err(StoreError::OutOfBounds));
        assert_eq!(check_range(16, usize::MAX, 1), Err(StoreError::OutOfBounds));
    }
}
