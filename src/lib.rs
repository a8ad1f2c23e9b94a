//! Notation Engine
//!
//! In-memory model of written music notation: measures holding parallel
//! voices of notes and tuplets, staves of measures and measure repeats, and
//! the derived facilities built on them (exact tick timing, clef lookup, tie
//! propagation and measure fill validation).
//!
//! # Example
//! ```
//! use notation_engine::{completion_state, CompletionState, Duration, Measure, Note, TimeSignature, Tone};
//!
//! let mut measure = Measure::new(TimeSignature::default());
//! for _ in 0..4 {
//!     measure.append(Note::new(Duration::QUARTER, vec![Tone::new(0, 0, 4)]), 0).unwrap();
//! }
//! assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
//! ```

pub mod error;
pub mod measure;
pub mod models;
pub mod staff;
pub mod validation;

// Re-export commonly used types
pub use error::{NotationError, Result};
pub use measure::{Measure, NoteLocation};
pub use models::*;
pub use staff::{MeasureLocation, MeasureRepeat, NotesHolder, Staff, StaffMeasure};
pub use validation::{completion_state, CompletionState};
