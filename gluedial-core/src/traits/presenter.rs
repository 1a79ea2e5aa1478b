//! Display presenter trait

use crate::mode::Snapshot;

/// Renders a dispenser snapshot
///
/// Layout, fonts and colours are entirely up to the implementation.
pub trait Presenter {
    /// Draw the given view
    fn present(&mut self, snapshot: &Snapshot<'_>);
}
