//! Quadrature encoder decoding
//!
//! Decodes the two-phase encoder signal into detents with a state machine
//! that rejects contact bounce: a detent only counts once the full
//! sequence has been seen.
//!
//! ```text
//! CW:   (1,1) -> A falls (0,1) -> (0,0) -> either rises  => +1
//! CCW:  (1,1) -> B falls (1,0) -> (0,0) -> either rises  => -1
//! ```
//!
//! Bouncing back to (1,1) mid-sequence returns to idle without a count.

use embedded_hal::digital::InputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Idle,
    CwStep1,
    CwStep2,
    CcwStep1,
    CcwStep2,
}

/// Pin-independent quadrature state machine
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    state: State,
    last_a: bool,
    last_b: bool,
    reverse: bool,
}

impl QuadratureDecoder {
    /// Create a decoder from the current pin levels
    pub fn new(a: bool, b: bool, reverse: bool) -> Self {
        Self {
            state: State::Idle,
            last_a: a,
            last_b: b,
            reverse,
        }
    }

    /// Feed the current levels, returning -1, 0 or +1
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        if a == self.last_a && b == self.last_b {
            return 0;
        }
        self.last_a = a;
        self.last_b = b;

        let step = self.decode(a, b);
        if self.reverse {
            -step
        } else {
            step
        }
    }

    fn decode(&mut self, a: bool, b: bool) -> i8 {
        match self.state {
            State::Idle => {
                if !a && b {
                    self.state = State::CwStep1;
                } else if a && !b {
                    self.state = State::CcwStep1;
                }
                0
            }
            State::CwStep1 | State::CcwStep1 => {
                if !a && !b {
                    self.state = if self.state == State::CwStep1 {
                        State::CwStep2
                    } else {
                        State::CcwStep2
                    };
                } else if a && b {
                    // Bounce
                    self.state = State::Idle;
                }
                0
            }
            State::CwStep2 => {
                if a || b {
                    self.state = State::Idle;
                    return 1;
                }
                0
            }
            State::CcwStep2 => {
                if a || b {
                    self.state = State::Idle;
                    return -1;
                }
                0
            }
        }
    }
}

/// Quadrature encoder on two input pins
///
/// Keeps a free-running detent counter. Poll every 1-2 ms.
pub struct Encoder<A, B> {
    a: A,
    b: B,
    decoder: QuadratureDecoder,
    count: i32,
}

impl<A: InputPin, B: InputPin> Encoder<A, B> {
    /// Create an encoder
    pub fn new(mut a: A, mut b: B, reverse: bool) -> Self {
        let level_a = a.is_high().unwrap_or(true);
        let level_b = b.is_high().unwrap_or(true);
        Self {
            a,
            b,
            decoder: QuadratureDecoder::new(level_a, level_b, reverse),
            count: 0,
        }
    }

    /// Sample the pins, returning the detent change
    pub fn poll(&mut self) -> i8 {
        let (Ok(a), Ok(b)) = (self.a.is_high(), self.b.is_high()) else {
            return 0;
        };
        let step = self.decoder.update(a, b);
        self.count = self.count.wrapping_add(step as i32);
        step
    }

    /// Detents since creation (clockwise positive)
    pub fn count(&self) -> i32 {
        self.count
    }
}
