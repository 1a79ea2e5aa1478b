//! Debounced push button

use embedded_hal::digital::InputPin;

/// Level debouncer
///
/// A new level is accepted once it has been stable for `debounce_ms`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce_ms: u32,
    stable: bool,
    candidate: bool,
    since_ms: u32,
}

impl Debouncer {
    /// Create a debouncer starting at `level`
    pub fn new(level: bool, debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            stable: level,
            candidate: level,
            since_ms: 0,
        }
    }

    /// Feed a raw sample, returning the debounced level
    pub fn update(&mut self, now_ms: u32, raw: bool) -> bool {
        if raw != self.candidate {
            self.candidate = raw;
            self.since_ms = now_ms;
        } else if raw != self.stable && now_ms.wrapping_sub(self.since_ms) >= self.debounce_ms {
            self.stable = raw;
        }
        self.stable
    }

    /// Debounced level
    pub fn level(&self) -> bool {
        self.stable
    }
}

/// Momentary button on an input pin
pub struct Button<P> {
    pin: P,
    active_low: bool,
    debouncer: Debouncer,
}

impl<P: InputPin> Button<P> {
    /// Create a button, assumed released at startup
    pub fn new(pin: P, active_low: bool, debounce_ms: u32) -> Self {
        Self {
            pin,
            active_low,
            debouncer: Debouncer::new(false, debounce_ms),
        }
    }

    /// Sample the pin, returning the debounced pressed state
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let Ok(high) = self.pin.is_high() else {
            return self.debouncer.level();
        };
        self.debouncer.update(now_ms, high != self.active_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[test]
    fn test_debounce_accepts_stable_level() {
        let mut d = Debouncer::new(false, 5);
        assert!(!d.update(0, true));
        assert!(!d.update(3, true));
        assert!(d.update(5, true));
        assert!(d.update(6, true));
    }

    #[test]
    fn test_debounce_rejects_glitch() {
        let mut d = Debouncer::new(false, 5);
        d.update(0, true);
        d.update(2, false);
        d.update(4, true);
        assert!(!d.update(8, true));
        assert!(d.update(9, true));
    }

    struct LevelPin(bool);

    impl ErrorType for LevelPin {
        type Error = Infallible;
    }

    impl InputPin for LevelPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_active_low_button() {
        let mut button = Button::new(LevelPin(true), true, 5);
        assert!(!button.poll(0));

        button.pin.0 = false;
        button.poll(10);
        assert!(button.poll(15));

        button.pin.0 = true;
        button.poll(20);
        assert!(!button.poll(25));
    }

    #[test]
    fn test_active_high_button() {
        let mut button = Button::new(LevelPin(true), false, 0);
        // Level change is latched on the first sample, accepted on the next
        assert!(!button.poll(0));
        assert!(button.poll(1));
    }
}
