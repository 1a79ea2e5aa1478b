//! Log-based presenter
//!
//! Writes the view to the defmt log. Stands in for the round display so
//! the dial can be driven from a debug probe.

use defmt::*;

use gluedial_core::mode::{Mode, SetupOption, Snapshot};
use gluedial_core::traits::Presenter;

/// Presenter that logs each snapshot
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&mut self, snapshot: &Snapshot<'_>) {
        if let Some(progress) = snapshot.dispense {
            info!(
                "[{}] {:?} {}% -> {} um",
                snapshot.mode.label(),
                progress.kind,
                progress.percent,
                progress.target_um
            );
            return;
        }

        match snapshot.mode {
            Mode::Manual => info!(
                "[{}] amount {} mm, at {} um",
                snapshot.mode.label(),
                snapshot.manual_amount_mm(),
                snapshot.position_um
            ),
            Mode::Parts => match snapshot.selected_part() {
                Some(part) => info!(
                    "[{}] {}/{} {} {} um",
                    snapshot.mode.label(),
                    snapshot.selected_index + 1,
                    snapshot.parts.len(),
                    part.name.as_str(),
                    part.length_um
                ),
                None => info!("[{}] no parts saved", snapshot.mode.label()),
            },
            Mode::Retract => info!(
                "[{}] at {} um, press to go home",
                snapshot.mode.label(),
                snapshot.position_um
            ),
            Mode::Setup => info!(
                "[{}] {}{}",
                snapshot.mode.label(),
                snapshot.setup_option.label(),
                match snapshot.setup_option {
                    SetupOption::SetHome => "",
                    SetupOption::SaveAsPart => " (current position)",
                }
            ),
        }
    }
}
