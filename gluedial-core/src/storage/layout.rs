//! Byte layout of the persistent region
//!
//! ```text
//! 0x00  home offset        i32 LE
//! 0x10  part count         i32 LE
//! 0x14  catalog CRC-32     u32 LE   (over count + used records)
//! 0x18  records[10]        16 bytes each
//!         name  [u8; 12]   NUL padded
//!         length f32 LE    millimetres
//! ```

/// Home offset address
pub const HOME_OFFSET_ADDR: usize = 0x00;

/// Catalog header address
pub const CATALOG_ADDR: usize = 0x10;

/// Part count address
pub const PART_COUNT_ADDR: usize = CATALOG_ADDR;

/// Catalog checksum address
pub const CATALOG_CRC_ADDR: usize = CATALOG_ADDR + 4;

/// First record address
pub const RECORDS_ADDR: usize = CATALOG_ADDR + 8;

/// Maximum number of stored parts
pub const PART_CAPACITY: usize = 10;

/// Part name buffer length
pub const NAME_LEN: usize = 12;

/// Size of one serialized part record
pub const RECORD_SIZE: usize = NAME_LEN + 4;

/// Bytes used by the layout
pub const REGION_SIZE: usize = RECORDS_ADDR + PART_CAPACITY * RECORD_SIZE;

/// Value read from an erased cell
pub const ERASED_WORD: u32 = 0xFFFF_FFFF;

/// Address of record `index`
pub const fn record_addr(index: usize) -> usize {
    RECORDS_ADDR + index * RECORD_SIZE
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_small_eeprom() {
        assert_eq!(REGION_SIZE, 184);
        assert!(REGION_SIZE <= 256);
        assert!(HOME_OFFSET_ADDR + 4 <= CATALOG_ADDR);
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }
}
