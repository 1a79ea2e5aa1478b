//! Classified input events

use gluedial_hal::Tone;

/// Input events produced by the [`InputClassifier`](super::InputClassifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Encoder moved by `delta` detents since the last event
    EncoderStep {
        /// Signed detent count (positive = clockwise)
        delta: i32,
        /// Previous movement was less than the fast-turn threshold ago
        fast: bool,
    },
    /// Button released before the long-press threshold
    ShortPress,
    /// Button held past the long-press threshold (emitted while still held)
    LongPress,
}

impl InputEvent {
    /// Returns true if this is a rotation event
    pub fn is_rotation(&self) -> bool {
        matches!(self, InputEvent::EncoderStep { .. })
    }

    /// Feedback tone for this event
    pub fn tone(&self) -> Tone {
        if self.is_rotation() {
            Tone::Detent
        } else {
            Tone::Click
        }
    }
}
