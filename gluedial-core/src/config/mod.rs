//! Configuration
//!
//! Machine configuration types, the steps ↔ micrometres conversion derived
//! from them, and a small parser for the `machine.toml` format.

pub mod parse;
pub mod scale;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use scale::UnitScale;
pub use types::*;
