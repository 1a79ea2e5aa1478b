//! Hardware abstraction traits
//!
//! These traits define the interface between the dispenser logic
//! and hardware-specific implementations.

pub mod presenter;
pub mod stepper;

pub use presenter::Presenter;
pub use stepper::StepGenerator;
