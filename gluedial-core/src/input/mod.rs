//! Operator input classification
//!
//! Turns the raw encoder counter and button level into discrete events.

pub mod classifier;
pub mod events;

pub use classifier::InputClassifier;
pub use events::InputEvent;
