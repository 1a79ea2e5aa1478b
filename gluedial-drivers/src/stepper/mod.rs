//! Stepper drivers

pub mod accel;

pub use accel::{AccelStepper, PULSE_WIDTH_US};
