//! Models module for the notation engine
//!
//! Value types shared by measures and staves: durations, notes, tuplets and
//! the opaque boundary types (tone, clef, instrument, time signature).

pub mod duration;
pub mod note;
pub mod note_collection;
pub mod pitch;
pub mod time_signature;
pub mod tuplet;

// Re-export commonly used types
pub use duration::{Duration, DurationValue, TickFraction, Ticks, MAX_DOT_COUNT, TICKS_PER_QUARTER};
pub use note::{Accent, Articulation, Dynamics, Note, Tie};
pub use note_collection::NoteCollection;
pub use pitch::{Clef, Instrument, Tone};
pub use time_signature::TimeSignature;
pub use tuplet::Tuplet;
