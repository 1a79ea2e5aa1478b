//! Control loop task
//!
//! Runs the dispenser tick. While a dispense is active the loop only
//! yields between ticks so the step generator is polled as often as the
//! executor allows; when idle it sleeps for the suggested tick period.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Instant, Timer};

use gluedial_core::config::MachineConfig;
use gluedial_core::mode::Effect;
use gluedial_core::storage::LoadReport;
use gluedial_core::{BootReport, Dispenser, RawInputs, TickReport};
use gluedial_drivers::stepper::AccelStepper;

use crate::channels::{BUTTON_PRESSED, BUTTON_PRESSES, ENCODER_COUNT};
use crate::eeprom::FlashEeprom;
use crate::presenter::LogPresenter;
use crate::speaker::ChannelSpeaker;

/// Extruder stepper on STEP/DIR/EN outputs
pub type DialStepper = AccelStepper<Output<'static>, Output<'static>, Output<'static>, Delay>;

/// Control task - owns the dispenser
#[embassy_executor::task]
pub async fn control_task(
    config: MachineConfig,
    stepper: DialStepper,
    store: FlashEeprom<'static>,
) {
    info!("Control task started");

    let (mut dispenser, boot) =
        Dispenser::boot(&config, stepper, store, ChannelSpeaker, read_inputs());
    log_boot(&boot);

    let mut presenter = LogPresenter;
    let start = Instant::now();

    loop {
        let report = dispenser.tick(start.elapsed().as_micros(), read_inputs());
        log_report(&report);

        if report.redraw {
            dispenser.render(&mut presenter);
        }

        if report.next_tick_us == 0 {
            yield_now().await;
        } else {
            Timer::after_micros(report.next_tick_us).await;
        }
    }
}

fn read_inputs() -> RawInputs {
    RawInputs {
        encoder_count: ENCODER_COUNT.load(Ordering::Relaxed),
        button_pressed: BUTTON_PRESSED.load(Ordering::Relaxed),
        button_presses: BUTTON_PRESSES.load(Ordering::Relaxed),
    }
}

fn log_boot(boot: &BootReport) {
    match boot.catalog {
        Ok(LoadReport::Loaded(count)) => info!("Loaded {} parts", count),
        Ok(LoadReport::Empty) => info!("Part catalog empty"),
        Ok(LoadReport::Blank) => info!("Part catalog not initialised"),
        Ok(LoadReport::Corrupted(reason)) => {
            warn!("Part catalog corrupted ({:?}), starting empty", reason)
        }
        Err(e) => error!("Failed to read part catalog: {:?}", e),
    }

    match boot.home_offset {
        Ok(Some(offset)) => info!("Home offset {} steps", offset),
        Ok(None) => info!("No home calibration stored"),
        Err(e) => error!("Failed to read home offset: {:?}", e),
    }
}

fn log_report(report: &TickReport) {
    if let Some(event) = report.input {
        trace!("Input: {:?}", event);
    }
    for effect in [report.effect, report.completion].into_iter().flatten() {
        log_effect(&effect);
    }
}

fn log_effect(effect: &Effect) {
    match effect {
        Effect::ModeChanged(mode) => info!("Mode: {}", mode.label()),
        Effect::DispenseStarted { kind, target_steps } => {
            info!("Dispense {:?} started, target {} steps", kind, target_steps)
        }
        Effect::DispenseComplete {
            kind,
            position_steps,
        } => info!("Dispense {:?} complete at {} steps", kind, position_steps),
        Effect::HomeSet { offset } => info!("Home set, offset {} steps", offset),
        Effect::PartSaved { index, length_um } => {
            info!("Saved part {} ({} um)", index + 1, length_um)
        }
        Effect::Rejected(reason) => debug!("Ignored: {:?}", reason),
        Effect::StorageFailed(e) => error!("Storage write failed: {:?}", e),
        Effect::AmountChanged(_)
        | Effect::SelectionChanged(_)
        | Effect::SetupOptionChanged(_) => trace!("{:?}", effect),
    }
}
