//! Board-agnostic core logic for the glue stick dispenser
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types, unit conversion and the config file parser
//! - Motion primitive trait and the extruder motion controller
//! - Input classification (encoder steps, short and long presses)
//! - Part catalog and calibration persistence
//! - Mode state machine
//! - The dispenser context and its control tick

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispenser;
pub mod input;
pub mod mode;
pub mod motion;
pub mod scheduler;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use dispenser::{BootReport, Context, Dispenser, RawInputs, TickReport};
