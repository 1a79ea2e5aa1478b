//! Input classifier
//!
//! Sampled once per control tick with the raw encoder counter, the
//! debounced button level and a free-running count of press edges. The
//! count lets a tap that started and ended between two samples still
//! register as a short press.
//!
//! Button gestures:
//!
//! ```text
//! press ──────────────── release           -> ShortPress (on release)
//! press ────[long_press_ms]──> LongPress   -> nothing on release
//! ```
//!
//! A long press fires while the button is still held so the operator hears
//! the click and can let go. At most one event is produced per sample; a
//! pending encoder movement is reported on the next sample if a button
//! gesture took this one.

use super::events::InputEvent;
use crate::config::InputConfig;

/// Raw input to event classifier
#[derive(Debug, Clone)]
pub struct InputClassifier {
    /// Fast-turn threshold (ms)
    fast_turn_ms: u32,
    /// Long-press threshold (ms)
    long_press_ms: u32,
    /// Encoder counter at the last reported movement
    last_encoder_pos: i32,
    /// Timestamp of the last reported movement
    last_move_ms: Option<u32>,
    /// Button level at the last sample
    pressed: bool,
    /// Press edge counter at the last sample
    last_presses: u32,
    /// When the current press started
    press_start_ms: u32,
    /// Current press already produced its event
    action_taken: bool,
}

impl InputClassifier {
    /// Create a classifier
    ///
    /// `encoder_count` and `presses` are the counter values at startup, so
    /// turns and presses made before the first sample are not replayed.
    pub fn new(config: &InputConfig, encoder_count: i32, presses: u32) -> Self {
        Self {
            fast_turn_ms: config.fast_turn_ms,
            long_press_ms: config.long_press_ms,
            last_encoder_pos: encoder_count,
            last_move_ms: None,
            pressed: false,
            last_presses: presses,
            press_start_ms: 0,
            action_taken: false,
        }
    }

    /// Sample raw inputs and classify
    pub fn sample(
        &mut self,
        now_ms: u32,
        encoder_count: i32,
        pressed: bool,
        presses: u32,
    ) -> Option<InputEvent> {
        if let Some(event) = self.sample_button(now_ms, pressed, presses) {
            return Some(event);
        }
        self.sample_encoder(now_ms, encoder_count)
    }

    fn sample_button(&mut self, now_ms: u32, pressed: bool, presses: u32) -> Option<InputEvent> {
        let new_edge = presses != self.last_presses;
        self.last_presses = presses;

        match (self.pressed, pressed) {
            (false, false) if new_edge => {
                // Whole tap happened between samples
                Some(InputEvent::ShortPress)
            }
            (true, true) if new_edge => {
                // Released and pressed again between samples
                let finished = !self.action_taken;
                self.press_start_ms = now_ms;
                self.action_taken = false;
                finished.then_some(InputEvent::ShortPress)
            }
            (false, true) => {
                self.pressed = true;
                self.press_start_ms = now_ms;
                self.action_taken = false;
                None
            }
            (true, true) => {
                let held_ms = now_ms.wrapping_sub(self.press_start_ms);
                if !self.action_taken && held_ms > self.long_press_ms {
                    self.action_taken = true;
                    Some(InputEvent::LongPress)
                } else {
                    None
                }
            }
            (true, false) => {
                self.pressed = false;
                if self.action_taken {
                    // Long press already consumed this gesture
                    None
                } else {
                    Some(InputEvent::ShortPress)
                }
            }
            (false, false) => None,
        }
    }

    fn sample_encoder(&mut self, now_ms: u32, encoder_count: i32) -> Option<InputEvent> {
        let delta = encoder_count.wrapping_sub(self.last_encoder_pos);
        if delta == 0 {
            return None;
        }

        let fast = self
            .last_move_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) < self.fast_turn_ms);

        self.last_encoder_pos = encoder_count;
        self.last_move_ms = Some(now_ms);

        Some(InputEvent::EncoderStep { delta, fast })
    }
}
