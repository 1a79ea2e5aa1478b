//! Operating modes
//!
//! The dial cycles through four modes on a long press. Each mode gives the
//! encoder and the short press a different meaning; the
//! [`ModeController`] owns that state and the active dispense session.

pub mod controller;
pub mod machine;
pub mod snapshot;

pub use controller::{DispenseKind, Effect, ModeController, Rejection};
pub use machine::{Mode, SetupOption};
pub use snapshot::{DispenseProgress, Snapshot};
