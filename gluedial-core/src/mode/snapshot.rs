//! Render snapshot
//!
//! Everything a presenter needs to draw the current view, borrowed from the
//! controller state for the duration of one redraw.

use super::controller::DispenseKind;
use super::machine::{Mode, SetupOption};
use crate::storage::Part;

/// Progress of the active dispense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispenseProgress {
    /// Session purpose
    pub kind: DispenseKind,
    /// Target position from home (µm)
    pub target_um: i32,
    /// Completion, 0-100
    pub percent: u8,
}

/// View of the dispenser state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    pub manual_amount_um: u32,
    pub selected_index: u8,
    pub parts: &'a [Part],
    pub setup_option: SetupOption,
    /// `Some` while a dispense is running
    pub dispense: Option<DispenseProgress>,
    /// Extruder position from home (µm)
    pub position_um: i32,
}

impl Snapshot<'_> {
    /// Part under the selection cursor
    pub fn selected_part(&self) -> Option<&Part> {
        self.parts.get(self.selected_index as usize)
    }

    /// Check if this is the idle view for the mode
    pub fn is_idle(&self) -> bool {
        self.dispense.is_none()
    }

    /// Manual amount in millimetres
    pub fn manual_amount_mm(&self) -> f32 {
        self.manual_amount_um as f32 / 1000.0
    }
}
