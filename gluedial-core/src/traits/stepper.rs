//! Motion primitive trait
//!
//! This trait abstracts over trapezoidal step generators: something that
//! accepts an absolute target in steps and advances toward it each time it
//! is polled, ramping speed up and down.

/// Trapezoidal step generator
///
/// Positions are absolute step counts. Only one target is tracked at a time;
/// calling [`StepGenerator::move_to`] replaces it.
pub trait StepGenerator {
    /// Set the speed limit in steps per second
    fn set_max_speed(&mut self, steps_per_s: f32);

    /// Set the acceleration/deceleration rate in steps per second squared
    fn set_acceleration(&mut self, steps_per_s2: f32);

    /// Redefine the current position without moving
    ///
    /// Also sets the target to `position` and drops any motion in progress.
    fn set_current_position(&mut self, position: i32);

    /// Set a new absolute target
    fn move_to(&mut self, target: i32);

    /// Current position, counted from emitted steps
    ///
    /// The extruder has no feedback, so this is where the motor was told to
    /// go, not a measurement.
    fn current_position(&self) -> i32;

    /// Most recently set target
    fn target_position(&self) -> i32;

    /// Steps remaining to the target (signed)
    fn distance_to_go(&self) -> i32 {
        self.target_position() - self.current_position()
    }

    /// Poll the generator, emitting at most one step if one is due
    ///
    /// Must be called at least once per step interval. Returns `true`
    /// while the motor is still moving toward the target.
    fn run(&mut self, now_us: u64) -> bool;

    /// Energise the driver
    fn enable_outputs(&mut self);

    /// Release the driver (motor free-wheels)
    fn disable_outputs(&mut self);
}
