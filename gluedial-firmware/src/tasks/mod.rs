//! Embassy tasks

mod buzzer;
mod control;
mod input;

pub use buzzer::buzzer_task;
pub use control::{control_task, DialStepper};
pub use input::input_task;
