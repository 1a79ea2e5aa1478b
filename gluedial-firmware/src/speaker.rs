//! Speaker backed by the buzzer task

use defmt::*;

use gluedial_hal::{Speaker, Tone};

use crate::channels::TONE_CHANNEL;

/// Queues tones for the buzzer task
///
/// Never blocks: when the queue is full the tone is dropped.
pub struct ChannelSpeaker;

impl Speaker for ChannelSpeaker {
    fn play(&mut self, tone: Tone) {
        if TONE_CHANNEL.try_send(tone).is_err() {
            trace!("Tone queue full, dropping {:?}", tone);
        }
    }
}
