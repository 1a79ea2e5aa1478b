//! Redraw throttling and tick spacing
//!
//! While a dispense runs, the loop ticks as fast as it can so the step
//! generator never stalls; redraws are limited to one per
//! `active_redraw_ms`. When idle, the loop sleeps `idle_tick_ms` between
//! ticks and redraws only after something changed.

use crate::config::UiConfig;

/// Redraw rate limiter
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    /// Minimum spacing between redraws while dispensing (ms)
    active_redraw_ms: u32,
    /// State changed since the last redraw
    dirty: bool,
    /// Time of the last redraw
    last_render_ms: Option<u32>,
}

impl RenderThrottle {
    /// Create a throttle; the first check always renders
    pub fn new(config: &UiConfig) -> Self {
        Self {
            active_redraw_ms: config.active_redraw_ms,
            dirty: true,
            last_render_ms: None,
        }
    }

    /// Request a redraw at the next opportunity
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Decide whether to redraw now
    ///
    /// Returns `true` at most once per `active_redraw_ms` while dispensing
    /// (progress changes every tick), otherwise only when dirty. A `true`
    /// result clears the dirty flag.
    pub fn should_render(&mut self, now_ms: u32, dispensing: bool) -> bool {
        let due = match (dispensing, self.last_render_ms) {
            (_, None) => true,
            (true, Some(last)) => now_ms.wrapping_sub(last) >= self.active_redraw_ms,
            (false, Some(_)) => self.dirty,
        };

        if due {
            self.dirty = false;
            self.last_render_ms = Some(now_ms);
        }
        due
    }
}

/// Delay before the next control tick (µs)
pub fn next_tick_us(config: &UiConfig, dispensing: bool) -> u64 {
    if dispensing {
        0
    } else {
        config.idle_tick_ms as u64 * 1000
    }
}
