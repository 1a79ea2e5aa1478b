//! Feedback tone output
//!
//! The dial gives audible feedback: a very short tick per encoder detent,
//! a click per committed button gesture and a longer tone when a dispense
//! finishes.

/// Feedback tones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    /// Encoder moved
    Detent,
    /// Button gesture committed (short or long press)
    Click,
    /// Dispense finished
    Success,
}

impl Tone {
    /// Tone frequency in Hz
    pub const fn frequency_hz(self) -> u16 {
        match self {
            Tone::Detent => 4000,
            Tone::Click => 2500,
            Tone::Success => 1800,
        }
    }

    /// Tone duration in milliseconds
    pub const fn duration_ms(self) -> u16 {
        match self {
            Tone::Detent => 2,
            Tone::Click => 12,
            Tone::Success => 150,
        }
    }
}

/// Speaker output
///
/// `play` must not block for the length of the tone; implementations
/// queue the tone or drive it from a timer.
pub trait Speaker {
    /// Start playing a tone
    fn play(&mut self, tone: Tone);
}
