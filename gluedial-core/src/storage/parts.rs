//! Part catalog
//!
//! Append-only list of named dispense lengths. The whole catalog is written
//! back and committed on every append.
//!
//! Loading never fails because of bad data: an erased region, an
//! out-of-range count or a checksum mismatch all produce an empty catalog
//! and leave the stored bytes alone. Only storage I/O errors are returned.

use core::fmt::Write;

use gluedial_hal::{ByteStore, ByteStoreExt, StoreError};
use heapless::{String, Vec};

use super::layout::{
    crc32_update, record_addr, CATALOG_CRC_ADDR, ERASED_WORD, NAME_LEN, PART_CAPACITY,
    PART_COUNT_ADDR, RECORD_SIZE,
};

/// A named dispense preset
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Part {
    /// Display name
    pub name: String<NAME_LEN>,
    /// Dispense length in micrometres
    pub length_um: u32,
}

impl Part {
    /// Create a part, truncating the name to the record size
    pub fn new(name: &str, length_um: u32) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            length_um,
        }
    }

    /// Length in millimetres
    pub fn length_mm(&self) -> f32 {
        self.length_um as f32 / 1000.0
    }

    fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let name = self.name.as_bytes();
        buf[..name.len()].copy_from_slice(name);
        buf[NAME_LEN..].copy_from_slice(&self.length_mm().to_le_bytes());
        buf
    }

    fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        let raw_name = &buf[..NAME_LEN];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = match core::str::from_utf8(&raw_name[..end]) {
            Ok(s) => s,
            // Keep whatever decodes
            Err(e) => core::str::from_utf8(&raw_name[..e.valid_up_to()]).unwrap_or(""),
        };

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&buf[NAME_LEN..]);
        let mm = f32::from_le_bytes(len_bytes);
        let length_um = if mm.is_finite() && mm > 0.0 {
            libm::roundf(mm * 1000.0) as u32
        } else {
            0
        };

        Self::new(name, length_um)
    }
}

/// Why a stored catalog was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CorruptReason {
    /// Stored count negative or above capacity
    CountOutOfRange(i32),
    /// Records do not match the stored checksum
    ChecksumMismatch,
}

/// Outcome of loading the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadReport {
    /// Region never written
    Blank,
    /// Stored catalog is empty
    Empty,
    /// Loaded this many parts
    Loaded(usize),
    /// Stored catalog discarded, starting empty
    Corrupted(CorruptReason),
}

/// In-memory part catalog and its persistence
#[derive(Debug, Clone, Default)]
pub struct PartStore {
    parts: Vec<Part, PART_CAPACITY>,
}

impl PartStore {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Load the catalog from storage
    pub fn load<S: ByteStore>(store: &mut S) -> Result<(Self, LoadReport), StoreError> {
        let raw_count = store.get_u32(PART_COUNT_ADDR)?;
        if raw_count == ERASED_WORD {
            return Ok((Self::new(), LoadReport::Blank));
        }

        let count = raw_count as i32;
        if count < 0 || count as usize > PART_CAPACITY {
            return Ok((
                Self::new(),
                LoadReport::Corrupted(CorruptReason::CountOutOfRange(count)),
            ));
        }
        if count == 0 {
            return Ok((Self::new(), LoadReport::Empty));
        }

        let mut crc = crc32_update(0xFFFF_FFFF, &count.to_le_bytes());
        let mut parts = Vec::new();
        for index in 0..count as usize {
            let mut buf = [0u8; RECORD_SIZE];
            store.read(record_addr(index), &mut buf)?;
            crc = crc32_update(crc, &buf);
            // Capacity checked above
            let _ = parts.push(Part::decode(&buf));
        }

        if store.get_u32(CATALOG_CRC_ADDR)? != !crc {
            return Ok((
                Self::new(),
                LoadReport::Corrupted(CorruptReason::ChecksumMismatch),
            ));
        }

        Ok((Self { parts }, LoadReport::Loaded(count as usize)))
    }

    /// Append a part and persist the whole catalog
    ///
    /// Returns `Ok(false)` without touching storage when the catalog is full.
    /// If persisting fails the part stays in memory and the error is
    /// returned; the next successful append writes it out.
    pub fn append<S: ByteStore>(&mut self, store: &mut S, part: Part) -> Result<bool, StoreError> {
        if self.parts.push(part).is_err() {
            return Ok(false);
        }
        self.persist(store)?;
        Ok(true)
    }

    fn persist<S: ByteStore>(&self, store: &mut S) -> Result<(), StoreError> {
        let count = self.parts.len() as i32;
        let mut crc = crc32_update(0xFFFF_FFFF, &count.to_le_bytes());

        for (index, part) in self.parts.iter().enumerate() {
            let buf = part.encode();
            crc = crc32_update(crc, &buf);
            store.write(record_addr(index), &buf)?;
        }

        store.put_i32(PART_COUNT_ADDR, count)?;
        store.put_u32(CATALOG_CRC_ADDR, !crc)?;
        store.commit()
    }

    /// Auto-generated name for the next part ("Part1", "Part2", ...)
    pub fn next_name(&self) -> String<NAME_LEN> {
        let mut name = String::new();
        let _ = write!(name, "Part{}", self.parts.len() + 1);
        name
    }

    /// Stored parts in order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Get a part by index
    pub fn get(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    /// Number of stored parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check if the catalog is at capacity
    pub fn is_full(&self) -> bool {
        self.parts.is_full()
    }
}
