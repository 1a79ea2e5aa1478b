//! EEPROM emulation in RP2040 flash
//!
//! The persistent region lives in the last 4 KB erase sector. A RAM mirror
//! takes all reads and writes; `commit` erases the sector and programs the
//! mirror back. Commits are skipped when nothing changed.
//!
//! Flash operations stall execution from flash for a few milliseconds, so
//! commits only happen on operator actions (set home, save part).

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use gluedial_hal::eeprom::check_range;
use gluedial_hal::{ByteStore, StoreError};

/// Flash size on the target board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Emulated EEPROM size
pub const EEPROM_SIZE: usize = 256;

/// Flash offset of the EEPROM sector
pub const EEPROM_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Flash-backed byte store
pub struct FlashEeprom<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    mirror: [u8; EEPROM_SIZE],
    loaded: bool,
    dirty: bool,
}

impl<'d> FlashEeprom<'d> {
    /// Take the flash peripheral and load the mirror
    ///
    /// A failed initial read leaves the store unusable; every access then
    /// returns [`StoreError::NotReady`].
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        let mut eeprom = Self {
            flash: Flash::new_blocking(flash),
            mirror: [0xFF; EEPROM_SIZE],
            loaded: false,
            dirty: false,
        };
        eeprom.loaded = eeprom
            .flash
            .blocking_read(EEPROM_OFFSET, &mut eeprom.mirror)
            .is_ok();
        eeprom
    }

    /// Check if the mirror was loaded from flash
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn ready(&self) -> Result<(), StoreError> {
        if self.loaded {
            Ok(())
        } else {
            Err(StoreError::NotReady)
        }
    }
}

impl ByteStore for FlashEeprom<'_> {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.ready()?;
        check_range(EEPROM_SIZE, address, buffer.len())?;
        buffer.copy_from_slice(&self.mirror[address..address + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError> {
        self.ready()?;
        check_range(EEPROM_SIZE, address, data.len())?;
        let cell = &mut self.mirror[address..address + data.len()];
        if *cell != *data {
            cell.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.ready()?;
        if !self.dirty {
            return Ok(());
        }

        self.flash
            .blocking_erase(EEPROM_OFFSET, EEPROM_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| StoreError::Flash)?;
        self.flash
            .blocking_write(EEPROM_OFFSET, &self.mirror)
            .map_err(|_| StoreError::Flash)?;

        self.dirty = false;
        Ok(())
    }
}
