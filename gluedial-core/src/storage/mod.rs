//! Persistent storage
//!
//! Part catalog and home calibration, stored in a small EEPROM-style
//! byte region at fixed addresses (see [`layout`]).

pub mod calibration;
pub mod layout;
pub mod parts;

pub use calibration::{load_home_offset, save_home_offset};
pub use parts::{CorruptReason, LoadReport, Part, PartStore};
