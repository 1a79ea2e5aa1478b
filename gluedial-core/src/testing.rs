//! In-memory doubles for host tests

use gluedial_hal::eeprom::check_range;
use gluedial_hal::{ByteStore, Speaker, StoreError, Tone};

use crate::traits::StepGenerator;

/// Size of the simulated EEPROM
pub const MEM_SIZE: usize = 256;

/// RAM-backed byte region
#[derive(Debug, Clone)]
pub struct MemStore {
    pub bytes: [u8; MEM_SIZE],
    pub capacity: usize,
    /// Successful commits
    pub commits: usize,
    /// Write calls
    pub writes: usize,
    /// Make the next commits fail
    pub fail_commit: bool,
}

impl MemStore {
    /// Freshly erased region (all 0xFF)
    pub fn erased() -> Self {
        Self::filled(0xFF, MEM_SIZE)
    }

    /// Region cleared to zero
    pub fn zeroed() -> Self {
        Self::filled(0x00, MEM_SIZE)
    }

    /// Erased region smaller than the layout needs
    pub fn with_capacity(capacity: usize) -> Self {
        Self::filled(0xFF, capacity.min(MEM_SIZE))
    }

    fn filled(value: u8, capacity: usize) -> Self {
        Self {
            bytes: [value; MEM_SIZE],
            capacity,
            commits: 0,
            writes: 0,
            fail_commit: false,
        }
    }
}

impl ByteStore for MemStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        check_range(self.capacity, address, buffer.len())?;
        buffer.copy_from_slice(&self.bytes[address..address + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError> {
        check_range(self.capacity, address, data.len())?;
        self.bytes[address..address + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Flash);
        }
        self.commits += 1;
        Ok(())
    }
}

/// Step generator that moves a fixed number of steps per `run`
#[derive(Debug, Clone)]
pub struct SimStepper {
    pub position: i32,
    pub target: i32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub enabled: bool,
    pub run_calls: usize,
    pub steps_per_run: i32,
}

impl SimStepper {
    /// Reaches any target in a single `run`
    pub fn new() -> Self {
        Self::with_steps_per_run(i32::MAX)
    }

    pub fn with_steps_per_run(steps_per_run: i32) -> Self {
        Self {
            position: 0,
            target: 0,
            max_speed: 0.0,
            acceleration: 0.0,
            enabled: false,
            run_calls: 0,
            steps_per_run,
        }
    }
}

impl StepGenerator for SimStepper {
    fn set_max_speed(&mut self, steps_per_s: f32) {
        self.max_speed = steps_per_s;
    }

    fn set_acceleration(&mut self, steps_per_s2: f32) {
        self.acceleration = steps_per_s2;
    }

    fn set_current_position(&mut self, position: i32) {
        self.position = position;
        self.target = position;
    }

    fn move_to(&mut self, target: i32) {
        self.target = target;
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn target_position(&self) -> i32 {
        self.target
    }

    fn run(&mut self, _now_us: u64) -> bool {
        self.run_calls += 1;
        let remaining = self.target - self.position;
        let step = remaining.abs().min(self.steps_per_run);
        self.position += step * remaining.signum();
        self.position != self.target
    }

    fn enable_outputs(&mut self) {
        self.enabled = true;
    }

    fn disable_outputs(&mut self) {
        self.enabled = false;
    }
}

/// Speaker that remembers what it played
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeaker {
    pub played: Vec<Tone>,
}

impl Speaker for RecordingSpeaker {
    fn play(&mut self, tone: Tone) {
        self.played.push(tone);
    }
}
