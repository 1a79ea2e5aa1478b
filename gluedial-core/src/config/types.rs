//! Configuration type definitions
//!
//! Mechanical parameters of the extruder, input timing thresholds and UI
//! cadence. Defaults describe the reference build: a 1.8° motor at 1/16
//! microstepping driving an 8 mm lead screw directly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extruder stepper configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperConfig {
    /// Full steps per motor rotation (typically 200 for 1.8° motors)
    pub full_steps_per_rotation: u16,
    /// Microsteps setting
    pub microsteps: u16,
    /// Gear ratio numerator (motor turns)
    pub gear_ratio_num: u16,
    /// Gear ratio denominator (screw turns)
    pub gear_ratio_den: u16,
    /// Travel per screw rotation in micrometres (lead pitch)
    pub rotation_distance_um: u32,
    /// Maximum speed in steps per second
    pub max_speed_steps_s: u32,
    /// Acceleration in steps per second squared
    pub accel_steps_s2: u32,
    /// Driver enable pin is active-low
    pub enable_inverted: bool,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            full_steps_per_rotation: 200,
            microsteps: 16,
            gear_ratio_num: 1,
            gear_ratio_den: 1,
            rotation_distance_um: 8000,
            max_speed_steps_s: 4000,
            accel_steps_s2: 8000,
            enable_inverted: true,
        }
    }
}

/// Operator input configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    /// Encoder movements closer together than this count as a fast turn
    pub fast_turn_ms: u32,
    /// Hold time after which a press becomes a long press
    pub long_press_ms: u32,
    /// Button pulls the pin low when pressed
    pub button_active_low: bool,
    /// Button level must be stable this long before a change is accepted
    pub button_debounce_ms: u32,
    /// Swap encoder direction
    pub encoder_reverse: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            fast_turn_ms: 100,
            long_press_ms: 800,
            button_active_low: true,
            button_debounce_ms: 5,
            encoder_reverse: false,
        }
    }
}

/// UI cadence configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    /// Minimum interval between redraws while dispensing
    pub active_redraw_ms: u32,
    /// Tick period while idle
    pub idle_tick_ms: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            active_redraw_ms: 50,
            idle_tick_ms: 50,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Extruder stepper
    pub stepper: StepperConfig,
    /// Operator input
    pub input: InputConfig,
    /// Display cadence
    pub ui: UiConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per rotation or microsteps is zero
    ZeroSteps,
    /// A gear ratio term is zero
    ZeroGearRatio,
    /// Rotation distance is zero
    ZeroRotationDistance,
    /// Speed or acceleration is zero
    ZeroSpeed,
    /// A timing value is zero
    ZeroTiming,
}

impl MachineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the configuration describes a usable machine
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.stepper;
        if s.full_steps_per_rotation == 0 || s.microsteps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if s.gear_ratio_num == 0 || s.gear_ratio_den == 0 {
            return Err(ConfigError::ZeroGearRatio);
        }
        if s.rotation_distance_um == 0 {
            return Err(ConfigError::ZeroRotationDistance);
        }
        if s.max_speed_steps_s == 0 || s.accel_steps_s2 == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.input.fast_turn_ms == 0
            || self.input.long_press_ms == 0
            || self.ui.active_redraw_ms == 0
            || self.ui.idle_tick_ms == 0
        {
            return Err(ConfigError::ZeroTiming);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(MachineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_microsteps_rejected() {
        let mut config = MachineConfig::default();
        config.stepper.microsteps = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSteps));
    }

    #[test]
    fn test_zero_gear_rejected() {
        let mut config = MachineConfig::default();
        config.stepper.gear_ratio_den = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroGearRatio));
    }

    #[test]
    fn test_zero_timing_rejected() {
        let mut config = MachineConfig::default();
        config.ui.idle_tick_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTiming));
    }
}
