//! Motion controller
//!
//! Wraps a [`StepGenerator`] with the extruder's unit conversion, driver
//! enable handling and the runtime copy of the home offset.
//!
//! Only one target is ever in flight. The motion controller does not
//! arbitrate overlapping commands: a new move replaces the old target, and
//! the mode controller is responsible for not issuing one while a dispense
//! is active.

use crate::config::{StepperConfig, UnitScale};
use crate::traits::StepGenerator;

/// Extruder motion controller
pub struct MotionController<G> {
    /// Underlying step generator
    stepper: G,
    /// Steps ↔ micrometres
    scale: UnitScale,
    /// Home offset (steps), mirrored from storage
    home_offset: i32,
    /// Driver outputs are energised
    outputs_enabled: bool,
}

impl<G: StepGenerator> MotionController<G> {
    /// Create a motion controller and apply the speed limits
    ///
    /// The driver starts released.
    pub fn new(mut stepper: G, config: &StepperConfig) -> Self {
        stepper.set_max_speed(config.max_speed_steps_s as f32);
        stepper.set_acceleration(config.accel_steps_s2 as f32);
        stepper.disable_outputs();

        Self {
            stepper,
            scale: UnitScale::from_config(config),
            home_offset: 0,
            outputs_enabled: false,
        }
    }

    /// Unit conversion in use
    pub fn scale(&self) -> &UnitScale {
        &self.scale
    }

    /// Move by a signed distance from the current position
    ///
    /// Returns the new target in steps.
    pub fn move_relative_um(&mut self, um: i32) -> i32 {
        let target = self
            .stepper
            .current_position()
            .saturating_add(self.scale.um_to_steps(um));
        self.start(target);
        target
    }

    /// Move to an absolute position measured from home
    ///
    /// Returns the new target in steps.
    pub fn move_absolute_um(&mut self, um: i32) -> i32 {
        let target = self.scale.um_to_steps(um);
        self.start(target);
        target
    }

    fn start(&mut self, target: i32) {
        if !self.outputs_enabled {
            self.stepper.enable_outputs();
            self.outputs_enabled = true;
        }
        self.stepper.move_to(target);
    }

    /// Advance the active move
    ///
    /// Must be called often enough to keep up with the step rate. Releases
    /// the driver once the target is reached. Returns `true` while moving.
    pub fn tick(&mut self, now_us: u64) -> bool {
        if !self.outputs_enabled {
            return false;
        }

        self.stepper.run(now_us);

        if self.stepper.distance_to_go() == 0 {
            self.stepper.disable_outputs();
            self.outputs_enabled = false;
            return false;
        }
        true
    }

    /// Check if a target is still outstanding
    pub fn is_moving(&self) -> bool {
        self.stepper.distance_to_go() != 0
    }

    /// Current position in steps
    pub fn current_position(&self) -> i32 {
        self.stepper.current_position()
    }

    /// Current target in steps
    pub fn target_position(&self) -> i32 {
        self.stepper.target_position()
    }

    /// Current position in micrometres from home
    pub fn current_position_um(&self) -> i32 {
        self.scale.steps_to_um(self.stepper.current_position())
    }

    /// Make the current position the new home
    ///
    /// The old counter value becomes the home offset and the counter is
    /// reset to zero. Returns the new offset; persisting it is up to the
    /// caller.
    pub fn set_home(&mut self) -> i32 {
        let offset = self.stepper.current_position();
        self.stepper.set_current_position(0);
        self.home_offset = offset;
        offset
    }

    /// Restore the offset loaded from storage at boot
    ///
    /// Informational only: the counter starts at zero on the assumption the
    /// extruder is parked at home, and moves (Retract included) never add
    /// this offset.
    pub fn restore_home_offset(&mut self, offset: i32) {
        self.home_offset = offset;
    }

    /// Home offset in steps
    pub fn home_offset(&self) -> i32 {
        self.home_offset
    }

    /// Check if the driver is energised
    pub fn outputs_enabled(&self) -> bool {
        self.outputs_enabled
    }

    /// Access the underlying step generator
    pub fn stepper(&self) -> &G {
        &self.stepper
    }
}
