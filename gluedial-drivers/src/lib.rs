//! Hardware driver implementations
//!
//! This crate provides concrete implementations over `embedded-hal` pins
//! for the parts of the dial the core logic consumes:
//!
//! - Stepper: trapezoidal step generator (STEP/DIR/EN driver)
//! - Encoder: quadrature decoder producing a detent counter
//! - Button: debounced momentary switch

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod encoder;
pub mod stepper;
