//! Validation over immutable measures

pub mod measure_duration;

pub use measure_duration::{available_durations, base_duration, completion_state, measure_ticks, CompletionState};
