//! Home offset persistence

use gluedial_hal::{ByteStore, ByteStoreExt, StoreError};

use super::layout::{ERASED_WORD, HOME_OFFSET_ADDR};

/// Load the stored home offset
///
/// Returns `None` for an erased cell. An offset of exactly -1 step shares
/// the erased bit pattern and also reads back as `None`.
pub fn load_home_offset<S: ByteStore>(store: &mut S) -> Result<Option<i32>, StoreError> {
    let raw = store.get_u32(HOME_OFFSET_ADDR)?;
    if raw == ERASED_WORD {
        return Ok(None);
    }
    Ok(Some(raw as i32))
}

/// Store the home offset and commit immediately
pub fn save_home_offset<S: ByteStore>(store: &mut S, offset: i32) -> Result<(), StoreError> {
    store.put_i32(HOME_OFFSET_ADDR, offset)?;
    store.commit()
}
