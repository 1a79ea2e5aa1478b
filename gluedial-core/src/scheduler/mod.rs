//! Control loop cadence
//!
//! Decides when the loop redraws and how long it may sleep between ticks.

pub mod cadence;

pub use cadence::{next_tick_us, RenderThrottle};
