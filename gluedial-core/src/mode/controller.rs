//! Mode controller
//!
//! Applies classified input to the mode state and issues motion and catalog
//! commands. Every handled event reports an [`Effect`] so the caller can
//! log it and schedule a redraw; rejected actions change nothing and are
//! reported as [`Effect::Rejected`].
//!
//! ```text
//!            long press          long press          long press
//!   Manual ─────────────> Parts ───────────> Retract ──────────> Setup
//!     ^                                                            │
//!     └─────────────── long press / short press (after action) ────┘
//! ```

use gluedial_hal::{ByteStore, StoreError};

use super::machine::{Mode, SetupOption};
use super::snapshot::{DispenseProgress, Snapshot};
use crate::dispenser::Context;
use crate::input::InputEvent;
use crate::storage::{save_home_offset, Part};
use crate::traits::StepGenerator;

/// Largest dialled manual amount (99.9 mm)
pub const MANUAL_MAX_UM: u32 = 99_900;

/// Manual amount change per slow encoder event (0.1 mm)
pub const SLOW_STEP_UM: u32 = 100;

/// Manual amount change per fast encoder event (0.5 mm)
pub const FAST_STEP_UM: u32 = 500;

/// Positions at or below this distance from home are not saved as parts
pub const SAVE_THRESHOLD_UM: u32 = 10;

/// What a dispense session was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispenseKind {
    /// Dialled manual amount
    Manual,
    /// Saved part at this catalog index
    Preset(u8),
    /// Return to home
    Retract,
}

/// Why an operator action was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Manual dispense with nothing dialled
    ZeroAmount,
    /// Part selection or dispense with no saved parts
    EmptyCatalog,
    /// A dispense is already running
    DispenseActive,
    /// Catalog has no spare capacity
    CatalogFull,
    /// Position too close to home to save
    BelowThreshold,
}

/// Observable result of handling an event or polling motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Mode advanced
    ModeChanged(Mode),
    /// Manual amount changed (micrometres)
    AmountChanged(u32),
    /// Selected part changed
    SelectionChanged(u8),
    /// Setup option toggled
    SetupOptionChanged(SetupOption),
    /// Dispense session started
    DispenseStarted {
        /// Session purpose
        kind: DispenseKind,
        /// Absolute target (steps)
        target_steps: i32,
    },
    /// Dispense session reached its target
    DispenseComplete {
        /// Session purpose
        kind: DispenseKind,
        /// Final position (steps)
        position_steps: i32,
    },
    /// Home moved to the current position and persisted
    HomeSet {
        /// Previous counter value (steps)
        offset: i32,
    },
    /// Current position saved as a new part and persisted
    PartSaved {
        /// Catalog index of the new part
        index: u8,
        /// Saved length (micrometres)
        length_um: u32,
    },
    /// Action dropped without changing state
    Rejected(Rejection),
    /// In-memory state changed but persisting it failed
    StorageFailed(StoreError),
}

/// One motion operation from trigger to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispenseSession {
    /// Session purpose
    pub kind: DispenseKind,
    /// Position when the session started (steps)
    pub start_steps: i32,
    /// Absolute target (steps)
    pub target_steps: i32,
}

impl DispenseSession {
    /// Completion percentage for the given position
    pub fn progress_pct(&self, position_steps: i32) -> u8 {
        let total = (self.target_steps as i64 - self.start_steps as i64).unsigned_abs();
        if total == 0 {
            return 100;
        }
        let done = (position_steps as i64 - self.start_steps as i64).unsigned_abs();
        (done.saturating_mul(100) / total).min(100) as u8
    }
}

/// Mode state machine and dispense session owner
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    /// Current mode
    mode: Mode,
    /// Dialled manual amount (µm), 0..=MANUAL_MAX_UM
    manual_amount_um: u32,
    /// Selected part, always < catalog length when the catalog is non-empty
    selected_index: u8,
    /// Setup mode action
    setup_option: SetupOption,
    /// Active dispense, at most one
    session: Option<DispenseSession>,
}

impl ModeController {
    /// Create a controller in manual mode with nothing dialled
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input event
    pub fn handle<G, S>(&mut self, event: InputEvent, ctx: &mut Context<G, S>) -> Option<Effect>
    where
        G: StepGenerator,
        S: ByteStore,
    {
        match event {
            InputEvent::LongPress => {
                self.mode = self.mode.next();
                Some(Effect::ModeChanged(self.mode))
            }
            InputEvent::EncoderStep { delta, fast } => self.on_rotate(delta, fast, ctx),
            InputEvent::ShortPress => self.on_press(ctx),
        }
    }

    /// Advance the active dispense
    ///
    /// Call every control tick. Returns [`Effect::DispenseComplete`] on the
    /// tick the target is reached.
    pub fn poll<G, S>(&mut self, now_us: u64, ctx: &mut Context<G, S>) -> Option<Effect>
    where
        G: StepGenerator,
        S: ByteStore,
    {
        let session = self.session?;

        ctx.motion.tick(now_us);
        if ctx.motion.is_moving() {
            return None;
        }

        self.session = None;
        Some(Effect::DispenseComplete {
            kind: session.kind,
            position_steps: ctx.motion.current_position(),
        })
    }

    fn on_rotate<G, S>(&mut self, delta: i32, fast: bool, ctx: &Context<G, S>) -> Option<Effect>
    where
        G: StepGenerator,
    {
        if self.session.is_some() || delta == 0 {
            return None;
        }

        match self.mode {
            Mode::Manual => {
                let step = if fast { FAST_STEP_UM } else { SLOW_STEP_UM };
                let amount = if delta > 0 {
                    self.manual_amount_um.saturating_add(step).min(MANUAL_MAX_UM)
                } else {
                    self.manual_amount_um.saturating_sub(step)
                };
                if amount == self.manual_amount_um {
                    return None;
                }
                self.manual_amount_um = amount;
                Some(Effect::AmountChanged(amount))
            }
            Mode::Parts => {
                let count = ctx.parts.len() as i32;
                if count == 0 {
                    return Some(Effect::Rejected(Rejection::EmptyCatalog));
                }
                let index = (self.selected_index as i32 + delta % count).rem_euclid(count);
                self.selected_index = index as u8;
                Some(Effect::SelectionChanged(self.selected_index))
            }
            Mode::Setup => {
                self.setup_option = self.setup_option.toggle();
                Some(Effect::SetupOptionChanged(self.setup_option))
            }
            Mode::Retract => None,
        }
    }

    fn on_press<G, S>(&mut self, ctx: &mut Context<G, S>) -> Option<Effect>
    where
        G: StepGenerator,
        S: ByteStore,
    {
        match self.mode {
            Mode::Manual => {
                if self.session.is_some() {
                    return Some(Effect::Rejected(Rejection::DispenseActive));
                }
                if self.manual_amount_um == 0 {
                    return Some(Effect::Rejected(Rejection::ZeroAmount));
                }
                let amount = self.manual_amount_um as i32;
                self.manual_amount_um = 0;
                Some(self.start_relative(DispenseKind::Manual, amount, ctx))
            }
            Mode::Parts => {
                if self.session.is_some() {
                    return Some(Effect::Rejected(Rejection::DispenseActive));
                }
                let index = self.selected_index;
                let length_um = match ctx.parts.get(index as usize) {
                    Some(part) => part.length_um,
                    None => return Some(Effect::Rejected(Rejection::EmptyCatalog)),
                };
                Some(self.start_relative(DispenseKind::Preset(index), length_um as i32, ctx))
            }
            Mode::Retract => {
                if self.session.is_some() {
                    return Some(Effect::Rejected(Rejection::DispenseActive));
                }
                let start_steps = ctx.motion.current_position();
                let target_steps = ctx.motion.move_absolute_um(0);
                Some(self.begin(DispenseKind::Retract, start_steps, target_steps))
            }
            Mode::Setup => {
                let effect = if self.session.is_some() {
                    Effect::Rejected(Rejection::DispenseActive)
                } else {
                    match self.setup_option {
                        SetupOption::SetHome => Self::set_home(ctx),
                        SetupOption::SaveAsPart => Self::save_part(ctx),
                    }
                };
                self.mode = Mode::Manual;
                Some(effect)
            }
        }
    }

    fn start_relative<G, S>(
        &mut self,
        kind: DispenseKind,
        length_um: i32,
        ctx: &mut Context<G, S>,
    ) -> Effect
    where
        G: StepGenerator,
    {
        let start_steps = ctx.motion.current_position();
        let target_steps = ctx.motion.move_relative_um(length_um);
        self.begin(kind, start_steps, target_steps)
    }

    fn begin(&mut self, kind: DispenseKind, start_steps: i32, target_steps: i32) -> Effect {
        self.session = Some(DispenseSession {
            kind,
            start_steps,
            target_steps,
        });
        Effect::DispenseStarted { kind, target_steps }
    }

    fn set_home<G, S>(ctx: &mut Context<G, S>) -> Effect
    where
        G: StepGenerator,
        S: ByteStore,
    {
        let offset = ctx.motion.set_home();
        match save_home_offset(&mut ctx.store, offset) {
            Ok(()) => Effect::HomeSet { offset },
            Err(e) => Effect::StorageFailed(e),
        }
    }

    fn save_part<G, S>(ctx: &mut Context<G, S>) -> Effect
    where
        G: StepGenerator,
        S: ByteStore,
    {
        if ctx.parts.is_full() {
            return Effect::Rejected(Rejection::CatalogFull);
        }
        let position = ctx.motion.current_position();
        if !ctx.motion.scale().steps_exceed_um(position, SAVE_THRESHOLD_UM) {
            return Effect::Rejected(Rejection::BelowThreshold);
        }
        let length_um = ctx.motion.current_position_um().unsigned_abs();

        let index = ctx.parts.len() as u8;
        let part = Part::new(&ctx.parts.next_name(), length_um);
        match ctx.parts.append(&mut ctx.store, part) {
            Ok(true) => Effect::PartSaved { index, length_um },
            Ok(false) => Effect::Rejected(Rejection::CatalogFull),
            Err(e) => Effect::StorageFailed(e),
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Dialled manual amount in micrometres
    pub fn manual_amount_um(&self) -> u32 {
        self.manual_amount_um
    }

    /// Selected part index
    pub fn selected_index(&self) -> u8 {
        self.selected_index
    }

    /// Current setup option
    pub fn setup_option(&self) -> SetupOption {
        self.setup_option
    }

    /// Active dispense session
    pub fn session(&self) -> Option<&DispenseSession> {
        self.session.as_ref()
    }

    /// Check if a dispense is running
    pub fn is_dispensing(&self) -> bool {
        self.session.is_some()
    }

    /// Build the view for the presenter
    pub fn snapshot<'a, G, S>(&self, ctx: &'a Context<G, S>) -> Snapshot<'a>
    where
        G: StepGenerator,
    {
        let position = ctx.motion.current_position();
        Snapshot {
            mode: self.mode,
            manual_amount_um: self.manual_amount_um,
            selected_index: self.selected_index,
            parts: ctx.parts.parts(),
            setup_option: self.setup_option,
            dispense: self.session.map(|s| DispenseProgress {
                kind: s.kind,
                target_um: ctx.motion.scale().steps_to_um(s.target_steps),
                percent: s.progress_pct(position),
            }),
            position_um: ctx.motion.current_position_um(),
        }
    }
}
