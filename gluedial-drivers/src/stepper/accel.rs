//! Trapezoidal step generator
//!
//! Drives a STEP/DIR/EN stepper driver (A4988, DRV8825, TMC2209 in
//! standalone mode) from a polled loop. Speed ramps use the step interval
//! recurrence from D. Austin, "Generate stepper-motor speed profiles in
//! real time" (2005):
//!
//! ```text
//! c0 = 0.676 * sqrt(2 / accel) * 1e6        first interval (µs)
//! cn = cn-1 - 2 * cn-1 / (4 * n + 1)        accelerate while n > 0
//! ```
//!
//! A negative `n` runs the same recurrence backwards to decelerate, so one
//! formula covers ramp up, cruise (clamped at `cmin`) and ramp down.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use gluedial_core::traits::StepGenerator;

/// STEP pulse high time (µs)
pub const PULSE_WIDTH_US: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Direction {
    Forward,
    Backward,
}

/// Polled trapezoidal stepper
///
/// Pin errors are ignored; on the target GPIO writes cannot fail.
pub struct AccelStepper<STEP, DIR, EN, D> {
    step: STEP,
    dir: DIR,
    enable: EN,
    delay: D,
    /// Enable pin is active-low
    enable_inverted: bool,
    position: i32,
    target: i32,
    /// Signed speed (steps/s)
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    /// Ramp step counter, negative while decelerating
    n: i32,
    /// Initial step interval (µs)
    c0: f32,
    /// Current step interval (µs)
    cn: f32,
    /// Interval at max speed (µs)
    cmin: f32,
    /// Interval until the next step (µs), 0 = stopped
    step_interval_us: u32,
    last_step_us: u64,
    direction: Direction,
}

impl<STEP, DIR, EN, D> AccelStepper<STEP, DIR, EN, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    D: DelayNs,
{
    /// Create a stepper with outputs released
    pub fn new(step: STEP, dir: DIR, enable: EN, delay: D, enable_inverted: bool) -> Self {
        let mut stepper = Self {
            step,
            dir,
            enable,
            delay,
            enable_inverted,
            position: 0,
            target: 0,
            speed: 0.0,
            max_speed: 1.0,
            acceleration: 0.0,
            n: 0,
            c0: 0.0,
            cn: 0.0,
            cmin: 1_000_000.0,
            step_interval_us: 0,
            last_step_us: 0,
            direction: Direction::Forward,
        };
        let _ = stepper.step.set_low();
        stepper.set_enable_pin(false);
        stepper
    }

    /// Check if the motor is stopped at its target
    pub fn is_running(&self) -> bool {
        self.speed != 0.0 || self.target != self.position
    }

    fn set_enable_pin(&mut self, on: bool) {
        if on != self.enable_inverted {
            let _ = self.enable.set_high();
        } else {
            let _ = self.enable.set_low();
        }
    }

    /// Emit a step if one is due
    fn run_speed(&mut self, now_us: u64) -> bool {
        if self.step_interval_us == 0 {
            return false;
        }
        if now_us.wrapping_sub(self.last_step_us) < self.step_interval_us as u64 {
            return false;
        }

        match self.direction {
            Direction::Forward => self.position += 1,
            Direction::Backward => self.position -= 1,
        }
        self.pulse();
        self.last_step_us = now_us;
        true
    }

    fn pulse(&mut self) {
        match self.direction {
            Direction::Forward => {
                let _ = self.dir.set_high();
            }
            Direction::Backward => {
                let _ = self.dir.set_low();
            }
        }
        let _ = self.step.set_high();
        self.delay.delay_us(PULSE_WIDTH_US);
        let _ = self.step.set_low();
    }

    /// Recompute the step interval after a step or a parameter change
    fn compute_new_speed(&mut self) {
        let distance_to = self.target - self.position;
        let steps_to_stop = if self.acceleration > 0.0 {
            ((self.speed * self.speed) / (2.0 * self.acceleration)) as i32
        } else {
            0
        };

        if distance_to == 0 && steps_to_stop <= 1 {
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        let ahead = distance_to.unsigned_abs() as i32;
        let toward = if distance_to > 0 {
            Direction::Forward
        } else {
            Direction::Backward
        };

        if self.n > 0 {
            // Would overshoot, or moving the wrong way: start decelerating
            if steps_to_stop >= ahead || self.direction != toward {
                self.n = -steps_to_stop;
            }
        } else if self.n < 0 && steps_to_stop < ahead && self.direction == toward {
            // Decelerating but there is room again
            self.n = -self.n;
        }

        if self.n == 0 {
            self.cn = self.c0;
            self.direction = toward;
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n) as f32 + 1.0);
            if self.cn < self.cmin {
                self.cn = self.cmin;
            }
        }
        self.n += 1;
        self.step_interval_us = self.cn as u32;

        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::Backward {
            self.speed = -self.speed;
        }
    }
}

impl<STEP, DIR, EN, D> StepGenerator for AccelStepper<STEP, DIR, EN, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    D: DelayNs,
{
    fn set_max_speed(&mut self, steps_per_s: f32) {
        let speed = libm::fabsf(steps_per_s);
        if speed == 0.0 || speed == self.max_speed {
            return;
        }
        self.max_speed = speed;
        self.cmin = 1_000_000.0 / speed;
        if self.n > 0 {
            // Recompute the ramp position for the new limit
            self.n = ((self.speed * self.speed) / (2.0 * self.acceleration)) as i32;
            self.compute_new_speed();
        }
    }

    fn set_acceleration(&mut self, steps_per_s2: f32) {
        if steps_per_s2 <= 0.0 || steps_per_s2 == self.acceleration {
            return;
        }
        if self.acceleration > 0.0 {
            self.n = (self.n as f32 * (self.acceleration / steps_per_s2)) as i32;
        }
        self.c0 = 0.676 * libm::sqrtf(2.0 / steps_per_s2) * 1_000_000.0;
        self.acceleration = steps_per_s2;
        self.compute_new_speed();
    }

    fn set_current_position(&mut self, position: i32) {
        self.position = position;
        self.target = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    fn move_to(&mut self, target: i32) {
        if self.target != target {
            self.target = target;
            self.compute_new_speed();
        }
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn target_position(&self) -> i32 {
        self.target
    }

    fn run(&mut self, now_us: u64) -> bool {
        if self.run_speed(now_us) {
            self.compute_new_speed();
        }
        self.is_running()
    }

    fn enable_outputs(&mut self) {
        self.set_enable_pin(true);
    }

    fn disable_outputs(&mut self) {
        self.set_enable_pin(false);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Mock GPIO pin counting rising edges
    #[derive(Default)]
    struct MockPin {
        high: bool,
        rises: u32,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            if !self.high {
                self.rises += 1;
            }
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestStepper = AccelStepper<MockPin, MockPin, MockPin, NoDelay>;

    fn stepper() -> TestStepper {
        let mut s = AccelStepper::new(
            MockPin::default(),
            MockPin::default(),
            MockPin::default(),
            NoDelay,
            true,
        );
        s.set_max_speed(4000.0);
        s.set_acceleration(8000.0);
        s
    }

    /// Run to completion, returning the times steps were emitted
    fn run_out(s: &mut TestStepper) -> Vec<u64> {
        let mut steps = Vec::new();
        let mut now = 0u64;
        let mut last = s.current_position();
        loop {
            let running = s.run(now);
            // The final step is taken by the call that reports done
            if s.current_position() != last {
                steps.push(now);
                last = s.current_position();
            }
            if !running {
                break;
            }
            now += 10;
            assert!(now < 10_000_000, "move did not finish");
        }
        steps
    }

    #[test]
    fn test_reaches_target_forward() {
        let mut s = stepper();
        s.move_to(400);
        let steps = run_out(&mut s);
        assert_eq!(s.current_position(), 400);
        assert_eq!(s.step.rises, 400);
        assert_eq!(steps.len(), 400);
        assert!(s.dir.high);
        assert!(!s.is_running());
    }

    #[test]
    fn test_reaches_target_backward() {
        let mut s = stepper();
        s.move_to(-150);
        run_out(&mut s);
        assert_eq!(s.current_position(), -150);
        assert_eq!(s.step.rises, 150);
        assert!(!s.dir.high);
    }

    #[test]
    fn test_ramps_up_and_down() {
        let mut s = stepper();
        s.move_to(2000);
        let steps = run_out(&mut s);
        let gaps: Vec<u64> = steps.windows(2).map(|w| w[1] - w[0]).collect();

        let first = gaps[0];
        let middle = gaps[gaps.len() / 2];
        let last = gaps[gaps.len() - 1];
        assert!(first > middle * 4, "first {} middle {}", first, middle);
        assert!(last > middle * 4, "last {} middle {}", last, middle);
        // Cruise at max speed: 250 µs per step, sampled every 10 µs
        assert!(middle >= 250 && middle <= 260);
    }

    #[test]
    fn test_retarget_reverses_smoothly() {
        let mut s = stepper();
        s.move_to(1000);
        let mut now = 0u64;
        while s.current_position() < 300 {
            s.run(now);
            now += 10;
        }
        s.move_to(0);
        let mut max_pos = s.current_position();
        while s.run(now) {
            max_pos = max_pos.max(s.current_position());
            now += 10;
            assert!(now < 10_000_000);
        }
        assert_eq!(s.current_position(), 0);
        // Decelerated past the reversal point instead of stopping dead
        assert!(max_pos > 300);
    }

    #[test]
    fn test_set_current_position_stops() {
        let mut s = stepper();
        s.move_to(100);
        s.run(0);
        s.set_current_position(0);
        assert_eq!(s.distance_to_go(), 0);
        assert!(!s.is_running());
        assert!(!s.run(1_000));
    }

    #[test]
    fn test_enable_polarity() {
        let mut s = stepper();
        // Active-low: released = high
        assert!(s.enable.high);
        s.enable_outputs();
        assert!(!s.enable.high);
        s.disable_outputs();
        assert!(s.enable.high);
    }
}
