//! Extruder motion
//!
//! Unit-aware wrapper over the step generator.

pub mod controller;

pub use controller::MotionController;
