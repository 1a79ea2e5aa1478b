//! Conversion between extruder travel and motor steps
//!
//! The number of steps per micrometre is kept as an exact fraction so that
//! converting a length to steps always gives the same answer. Every dispense
//! is computed from the live step counter plus a freshly converted length,
//! so rounding never accumulates across dispenses.

use super::types::StepperConfig;

/// Exact steps-per-micrometre ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitScale {
    /// Steps per `um_den` micrometres
    steps_num: u64,
    /// Micrometres per `steps_num` steps
    um_den: u64,
}

impl UnitScale {
    /// Derive the scale from the stepper mechanics
    ///
    /// `steps/um = full_steps × microsteps × gear_num / (gear_den × rotation_distance_um)`
    ///
    /// Zero terms are treated as 1; run `MachineConfig::validate` first.
    pub fn from_config(config: &StepperConfig) -> Self {
        let num = u64::from(config.full_steps_per_rotation.max(1))
            * u64::from(config.microsteps.max(1))
            * u64::from(config.gear_ratio_num.max(1));
        let den =
            u64::from(config.gear_ratio_den.max(1)) * u64::from(config.rotation_distance_um.max(1));
        Self::new(num, den)
    }

    /// Create a scale of `steps` per `um` micrometres
    pub fn new(steps: u64, um: u64) -> Self {
        let steps = steps.max(1);
        let um = um.max(1);
        let g = gcd(steps, um);
        Self {
            steps_num: steps / g,
            um_den: um / g,
        }
    }

    /// Convert a signed travel in micrometres to steps, rounding to nearest
    pub fn um_to_steps(&self, um: i32) -> i32 {
        let n = i64::from(um) * self.steps_num as i64;
        clamp_i32(div_round(n, self.um_den as i64))
    }

    /// Convert a signed step count to micrometres, rounding to nearest
    pub fn steps_to_um(&self, steps: i32) -> i32 {
        let n = i64::from(steps) * self.um_den as i64;
        clamp_i32(div_round(n, self.steps_num as i64))
    }

    /// Check whether `steps` covers strictly more than `um` micrometres
    ///
    /// Exact in either direction of travel, no rounding.
    pub fn steps_exceed_um(&self, steps: i32, um: u32) -> bool {
        u64::from(steps.unsigned_abs()) * self.um_den > u64::from(um) * self.steps_num
    }

    /// Steps per millimetre, for display and logging only
    pub fn steps_per_mm(&self) -> f32 {
        self.steps_num as f32 * 1000.0 / self.um_den as f32
    }
}

/// Integer division rounding half away from zero (`d > 0`)
fn div_round(n: i64, d: i64) -> i64 {
    let half = d / 2;
    if n >= 0 {
        (n + half) / d
    } else {
        (n - half) / d
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
