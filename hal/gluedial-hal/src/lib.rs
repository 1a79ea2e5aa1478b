//! Gluedial Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the dispenser logic
//! needs from a board: a small persistent byte region (EEPROM or an emulation
//! of it in flash) and a speaker for feedback tones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (gluedial-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gluedial-core (dispenser logic)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gluedial-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`eeprom::ByteStore`] - Addressable persistent byte region
//! - [`tone::Speaker`] - Feedback tone output

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod tone;

// Re-export key traits at crate root for convenience
pub use eeprom::{ByteStore, ByteStoreExt, StoreError};
pub use tone::{Speaker, Tone};
