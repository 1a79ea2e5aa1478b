//! Gluedial - Glue Stick Dispenser Firmware
//!
//! Main firmware binary for RP2040-based dispensers: a stepper-driven
//! extruder, a rotary dial with one push-button and a piezo buzzer.
//!
//! Task layout:
//!
//! - `input_task` polls the dial pins every millisecond
//! - `control_task` runs the dispenser tick (modes, motion, persistence)
//! - `buzzer_task` plays feedback tones

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use gluedial_core::config::{parse_config, MachineConfig, UnitScale};
use gluedial_drivers::stepper::AccelStepper;

use crate::eeprom::FlashEeprom;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

mod channels;
mod eeprom;
mod presenter;
mod speaker;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Gluedial firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let scale = UnitScale::from_config(&config.stepper);
    info!(
        "Extruder: {}x{} steps/rev, {}/{} gear, {} um/rev ({} steps/mm)",
        config.stepper.full_steps_per_rotation,
        config.stepper.microsteps,
        config.stepper.gear_ratio_num,
        config.stepper.gear_ratio_den,
        config.stepper.rotation_distance_um,
        scale.steps_per_mm()
    );

    // Persistent storage in the last flash sector
    let store = FlashEeprom::new(p.FLASH);
    if !store.is_loaded() {
        error!("Flash read failed, calibration and parts unavailable");
    }

    // Stepper driver
    // Pin assignments are board-specific (STEP=GPIO11, DIR=GPIO10, ENABLE=GPIO12)
    let stepper = AccelStepper::new(
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_12, Level::High),
        Delay,
        config.stepper.enable_inverted,
    );
    info!("Stepper initialized");

    // Dial: encoder A/B on GPIO2/GPIO3, push-button on GPIO4
    let enc_a = Input::new(p.PIN_2, Pull::Up);
    let enc_b = Input::new(p.PIN_3, Pull::Up);
    let button = Input::new(p.PIN_4, Pull::Up);

    // Passive piezo on GPIO5
    let buzzer = Output::new(p.PIN_5, Level::Low);

    spawner
        .spawn(tasks::input_task(enc_a, enc_b, button, config.input))
        .unwrap();
    spawner.spawn(tasks::buzzer_task(buzzer)).unwrap();
    spawner
        .spawn(tasks::control_task(config, stepper, store))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse and validate the embedded configuration
///
/// Falls back to built-in defaults if machine.toml is broken. build.rs
/// rejects invalid files, so this only happens during development.
fn load_config() -> MachineConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            return MachineConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Invalid embedded config: {:?}", e);
            error!("Using default configuration");
            MachineConfig::default()
        }
    }
}
