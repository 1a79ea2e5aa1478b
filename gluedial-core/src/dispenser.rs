//! Dispenser context and control tick
//!
//! [`Dispenser`] ties the pieces together: it owns the hardware-facing
//! context (motion controller, part catalog and byte store), the mode
//! controller, the input classifier and the redraw throttle. The firmware
//! calls [`Dispenser::tick`] in a loop; tests call it with simulated time.
//!
//! One tick:
//!
//! 1. Classify raw inputs into at most one event
//! 2. Apply the event to the mode controller
//! 3. Advance the active dispense
//! 4. Decide whether to redraw and how long to wait

use gluedial_hal::{ByteStore, Speaker, StoreError, Tone};

use crate::config::{MachineConfig, UiConfig};
use crate::input::{InputClassifier, InputEvent};
use crate::mode::{Effect, ModeController, Snapshot};
use crate::motion::MotionController;
use crate::scheduler::{next_tick_us, RenderThrottle};
use crate::storage::{load_home_offset, LoadReport, PartStore};
use crate::traits::{Presenter, StepGenerator};

/// Raw operator inputs sampled by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawInputs {
    /// Free-running encoder detent counter
    pub encoder_count: i32,
    /// Debounced button level (true = pressed)
    pub button_pressed: bool,
    /// Free-running count of debounced press edges
    pub button_presses: u32,
}

/// State shared between the mode controller and the hardware
pub struct Context<G, S> {
    pub motion: MotionController<G>,
    pub parts: PartStore,
    pub store: S,
}

/// What happened while restoring persistent state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Catalog load outcome
    pub catalog: Result<LoadReport, StoreError>,
    /// Stored home offset, `None` if never calibrated
    pub home_offset: Result<Option<i32>, StoreError>,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Classified input, if any
    pub input: Option<InputEvent>,
    /// Result of applying the input
    pub effect: Option<Effect>,
    /// Dispense completion, if it finished this tick
    pub completion: Option<Effect>,
    /// Caller should redraw now
    pub redraw: bool,
    /// Suggested delay before the next tick (µs)
    pub next_tick_us: u64,
}

/// Glue stick dispenser
pub struct Dispenser<G, S, K> {
    ctx: Context<G, S>,
    modes: ModeController,
    input: InputClassifier,
    throttle: RenderThrottle,
    ui: UiConfig,
    speaker: K,
}

impl<G, S, K> Dispenser<G, S, K>
where
    G: StepGenerator,
    S: ByteStore,
    K: Speaker,
{
    /// Restore persistent state and build the dispenser
    ///
    /// Storage errors are reported, not fatal: the dispenser starts with an
    /// empty catalog and zero home offset.
    pub fn boot(
        config: &MachineConfig,
        stepper: G,
        mut store: S,
        speaker: K,
        inputs: RawInputs,
    ) -> (Self, BootReport) {
        let mut motion = MotionController::new(stepper, &config.stepper);

        let (parts, catalog) = match PartStore::load(&mut store) {
            Ok((parts, report)) => (parts, Ok(report)),
            Err(e) => (PartStore::new(), Err(e)),
        };

        let home_offset = load_home_offset(&mut store);
        if let Ok(Some(offset)) = home_offset {
            motion.restore_home_offset(offset);
        }

        let dispenser = Self {
            ctx: Context {
                motion,
                parts,
                store,
            },
            modes: ModeController::new(),
            input: InputClassifier::new(
                &config.input,
                inputs.encoder_count,
                inputs.button_presses,
            ),
            throttle: RenderThrottle::new(&config.ui),
            ui: config.ui,
            speaker,
        };

        (
            dispenser,
            BootReport {
                catalog,
                home_offset,
            },
        )
    }

    /// Run one control tick
    pub fn tick(&mut self, now_us: u64, raw: RawInputs) -> TickReport {
        let now_ms = (now_us / 1000) as u32;
        let mut report = TickReport::default();

        report.input = self.input.sample(
            now_ms,
            raw.encoder_count,
            raw.button_pressed,
            raw.button_presses,
        );
        if let Some(event) = report.input {
            self.speaker.play(event.tone());
            report.effect = self.modes.handle(event, &mut self.ctx);
            if report.effect.is_some() {
                self.throttle.mark_dirty();
            }
        }

        report.completion = self.modes.poll(now_us, &mut self.ctx);
        if report.completion.is_some() {
            self.speaker.play(Tone::Success);
            self.throttle.mark_dirty();
        }

        let dispensing = self.modes.is_dispensing();
        report.redraw = self.throttle.should_render(now_ms, dispensing);
        report.next_tick_us = next_tick_us(&self.ui, dispensing);
        report
    }

    /// Current view
    pub fn snapshot(&self) -> Snapshot<'_> {
        self.modes.snapshot(&self.ctx)
    }

    /// Draw the current view
    pub fn render<P: Presenter>(&self, presenter: &mut P) {
        presenter.present(&self.snapshot());
    }

    /// Mode controller state
    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    /// Hardware-facing context
    pub fn context(&self) -> &Context<G, S> {
        &self.ctx
    }

    /// Speaker
    pub fn speaker(&self) -> &K {
        &self.speaker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepperConfig;
    use crate::mode::{DispenseKind, Mode, Rejection};
    use crate::storage::{save_home_offset, Part};
    use crate::testing::{MemStore, RecordingSpeaker, SimStepper};
    use proptest::prelude::*;

    type TestDispenser = Dispenser<SimStepper, MemStore, RecordingSpeaker>;

    /// Drives a dispenser with simulated time and a simulated dial
    struct Bench {
        dispenser: TestDispenser,
        now_ms: u64,
        encoder: i32,
        pressed: bool,
        presses: u32,
    }

    impl Bench {
        fn new(stepper: SimStepper, store: MemStore) -> Self {
            let (dispenser, _) = Dispenser::boot(
                &MachineConfig::default(),
                stepper,
                store,
                RecordingSpeaker::default(),
                RawInputs::default(),
            );
            Self {
                dispenser,
                now_ms: 0,
                encoder: 0,
                pressed: false,
                presses: 0,
            }
        }

        fn advance(&mut self, ms: u64) -> TickReport {
            self.now_ms += ms;
            self.dispenser.tick(
                self.now_ms * 1000,
                RawInputs {
                    encoder_count: self.encoder,
                    button_pressed: self.pressed,
                    button_presses: self.presses,
                },
            )
        }

        fn turn(&mut self, delta: i32, gap_ms: u64) -> TickReport {
            self.encoder += delta;
            self.advance(gap_ms)
        }

        fn press(&mut self) {
            self.pressed = true;
            self.presses = self.presses.wrapping_add(1);
        }

        fn short_press(&mut self) -> TickReport {
            self.press();
            self.advance(10);
            self.pressed = false;
            self.advance(50)
        }

        /// Press and release between two ticks
        fn tap(&mut self, gap_ms: u64) -> TickReport {
            self.presses = self.presses.wrapping_add(1);
            self.advance(gap_ms)
        }

        fn long_press(&mut self) -> TickReport {
            self.press();
            self.advance(10);
            let report = self.advance(900);
            self.pressed = false;
            self.advance(10);
            report
        }

        fn run_until_complete(&mut self) -> Option<Effect> {
            for _ in 0..10_000 {
                let report = self.advance(1);
                if report.completion.is_some() {
                    return report.completion;
                }
            }
            None
        }
    }

    #[test]
    fn test_dial_and_dispense_five_mm() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());

        for _ in 0..50 {
            let report = bench.turn(1, 200);
            assert!(matches!(report.effect, Some(Effect::AmountChanged(_))));
        }
        assert_eq!(bench.dispenser.modes().manual_amount_um(), 5000);

        let start = bench.dispenser.context().motion.current_position();
        let report = bench.short_press();
        assert_eq!(
            report.effect,
            Some(Effect::DispenseStarted {
                kind: DispenseKind::Manual,
                target_steps: start + 2000,
            })
        );

        // Completion may land on the same tick with an instant stepper
        let done = report.completion.or_else(|| bench.run_until_complete());
        assert!(matches!(done, Some(Effect::DispenseComplete { .. })));

        let snap = bench.dispenser.snapshot();
        assert_eq!(snap.mode, Mode::Manual);
        assert_eq!(snap.manual_amount_um, 0);
        assert!(snap.is_idle());
        assert_eq!(snap.position_um, 5000);
    }

    #[test]
    fn test_fast_turns_dial_quickly() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        bench.turn(1, 200);
        for _ in 0..10 {
            bench.turn(1, 20);
        }
        assert_eq!(bench.dispenser.modes().manual_amount_um(), 100 + 10 * 500);
    }

    #[test]
    fn test_four_long_presses_return_to_start() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        let mut modes = [Mode::Manual; 4];
        for slot in modes.iter_mut() {
            let report = bench.long_press();
            assert_eq!(report.input, Some(InputEvent::LongPress));
            *slot = bench.dispenser.modes().mode();
        }
        assert_eq!(modes, [Mode::Parts, Mode::Retract, Mode::Setup, Mode::Manual]);
    }

    #[test]
    fn test_tones() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        bench.turn(1, 200);
        bench.short_press();
        bench.run_until_complete();

        let played = &bench.dispenser.speaker().played;
        assert_eq!(played.as_slice(), &[Tone::Detent, Tone::Click, Tone::Success]);
    }

    #[test]
    fn test_rejected_action_still_clicks() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        let report = bench.short_press();
        assert_eq!(report.effect, Some(Effect::Rejected(Rejection::ZeroAmount)));
        assert_eq!(bench.dispenser.speaker().played, [Tone::Click]);
    }

    #[test]
    fn test_tap_between_idle_ticks_dispenses() {
        let mut bench = Bench::new(SimStepper::with_steps_per_run(1), MemStore::erased());
        bench.turn(1, 200);
        let idle = bench.advance(50);
        assert_eq!(idle.next_tick_us, 50_000);

        // Level reads released on both ticks, only the edge counter moved
        let report = bench.tap(50);
        assert_eq!(report.input, Some(InputEvent::ShortPress));
        assert!(matches!(
            report.effect,
            Some(Effect::DispenseStarted {
                kind: DispenseKind::Manual,
                ..
            })
        ));
        assert_eq!(bench.dispenser.speaker().played, [Tone::Detent, Tone::Click]);
    }

    #[test]
    fn test_cadence() {
        let mut bench = Bench::new(SimStepper::with_steps_per_run(1), MemStore::erased());
        let first = bench.advance(50);
        assert!(first.redraw);
        assert_eq!(first.next_tick_us, 50_000);
        assert!(!bench.advance(50).redraw);

        bench.turn(1, 200);
        let report = bench.short_press();
        assert_eq!(report.next_tick_us, 0);

        let redraws = (0..20).filter(|_| bench.advance(5).redraw).count();
        assert_eq!(redraws, 2);

        let done = loop {
            let report = bench.advance(5);
            if report.completion.is_some() {
                break report;
            }
        };
        assert!(done.redraw);
        assert_eq!(done.next_tick_us, 50_000);
    }

    #[test]
    fn test_boot_restores_catalog_and_offset() {
        let mut store = MemStore::erased();
        let mut parts = PartStore::new();
        parts.append(&mut store, Part::new("Part1", 4200)).unwrap();
        save_home_offset(&mut store, -77).unwrap();

        let (dispenser, report) = Dispenser::boot(
            &MachineConfig::default(),
            SimStepper::new(),
            store,
            RecordingSpeaker::default(),
            RawInputs::default(),
        );
        assert_eq!(report.catalog, Ok(LoadReport::Loaded(1)));
        assert_eq!(report.home_offset, Ok(Some(-77)));
        assert_eq!(dispenser.context().motion.home_offset(), -77);
        assert_eq!(dispenser.context().motion.current_position(), 0);
        assert_eq!(dispenser.snapshot().parts[0].length_um, 4200);
    }

    #[test]
    fn test_boot_with_broken_store() {
        let (dispenser, report) = Dispenser::boot(
            &MachineConfig::default(),
            SimStepper::new(),
            MemStore::with_capacity(2),
            RecordingSpeaker::default(),
            RawInputs::default(),
        );
        assert_eq!(report.catalog, Err(StoreError::OutOfBounds));
        assert_eq!(report.home_offset, Err(StoreError::OutOfBounds));
        assert!(dispenser.snapshot().parts.is_empty());
    }

    #[test]
    fn test_save_part_survives_reboot() {
        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        for _ in 0..6 {
            bench.turn(1, 20);
        }
        bench.short_press();
        bench.run_until_complete();

        for _ in 0..3 {
            bench.long_press();
        }
        bench.turn(1, 200);
        let report = bench.short_press();
        assert_eq!(
            report.effect,
            Some(Effect::PartSaved {
                index: 0,
                length_um: 2600,
            })
        );

        let store = bench.dispenser.context().store.clone();
        let (rebooted, boot) = Dispenser::boot(
            &MachineConfig::default(),
            SimStepper::new(),
            store,
            RecordingSpeaker::default(),
            RawInputs::default(),
        );
        assert_eq!(boot.catalog, Ok(LoadReport::Loaded(1)));
        assert_eq!(rebooted.snapshot().parts, bench.dispenser.snapshot().parts);
    }

    #[test]
    fn test_render_uses_snapshot() {
        struct Capture(Option<(Mode, u32)>);
        impl Presenter for Capture {
            fn present(&mut self, snapshot: &Snapshot<'_>) {
                self.0 = Some((snapshot.mode, snapshot.manual_amount_um));
            }
        }

        let mut bench = Bench::new(SimStepper::new(), MemStore::erased());
        bench.turn(-1, 200);
        bench.turn(1, 200);
        let mut capture = Capture(None);
        bench.dispenser.render(&mut capture);
        assert_eq!(capture.0, Some((Mode::Manual, 100)));
    }

    fn context() -> Context<SimStepper, MemStore> {
        Context {
            motion: MotionController::new(SimStepper::new(), &StepperConfig::default()),
            parts: PartStore::new(),
            store: MemStore::erased(),
        }
    }

    proptest! {
        #[test]
        fn manual_amount_bounded_and_monotonic(
            turns in prop::collection::vec((-50i32..=50, any::<bool>()), 1..400)
        ) {
            let mut ctx = context();
            let mut modes = ModeController::new();
            for (delta, fast) in turns {
                let before = modes.manual_amount_um();
                modes.handle(InputEvent::EncoderStep { delta, fast }, &mut ctx);
                let after = modes.manual_amount_um();

                prop_assert!(after <= 99_900);
                if delta > 0 {
                    prop_assert!(after >= before);
                } else {
                    prop_assert!(after <= before);
                }
            }
        }

        #[test]
        fn preset_selection_wraps(count in 1usize..=10, deltas in prop::collection::vec(-25i32..=25, 1..50)) {
            let mut ctx = context();
            for _ in 0..count {
                let name = ctx.parts.next_name();
                ctx.parts.append(&mut ctx.store, Part::new(&name, 1000)).unwrap();
            }
            let mut modes = ModeController::new();
            modes.handle(InputEvent::LongPress, &mut ctx);

            let mut expected = 0i32;
            for delta in deltas {
                modes.handle(InputEvent::EncoderStep { delta, fast: false }, &mut ctx);
                if delta != 0 {
                    expected = (expected + delta).rem_euclid(count as i32);
                }
                prop_assert_eq!(modes.selected_index() as i32, expected);
            }
        }
    }
}
