//! Inter-task communication
//!
//! The input task owns the encoder and button pins and publishes their
//! counters and button level through atomics; the control task reads them each tick. Tones go
//! to the buzzer task through a channel.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicBool, AtomicI32, AtomicU32};

use gluedial_hal::Tone;

/// Channel capacity for queued tones
const TONE_CHANNEL_SIZE: usize = 8;

/// Free-running encoder detent counter (updated by input task)
pub static ENCODER_COUNT: AtomicI32 = AtomicI32::new(0);

/// Debounced button level (updated by input task)
pub static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// Debounced press edges, free-running (updated by input task)
///
/// Taps shorter than the control tick leave the level unchanged between
/// two samples; the counter still moves.
pub static BUTTON_PRESSES: AtomicU32 = AtomicU32::new(0);

/// Tones to play (consumed by buzzer task)
pub static TONE_CHANNEL: Channel<CriticalSectionRawMutex, Tone, TONE_CHANNEL_SIZE> =
    Channel::new();
