//! Error types for the notation engine
//!
//! Every fallible operation returns [`NotationError`]. Index errors are always
//! checked first, and no operation leaves partial state behind when it fails.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, NotationError>;

/// Top-level error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    // ------------------------------------------------------------------
    // Index errors
    // ------------------------------------------------------------------
    /// Flat note index, voice index or global measure index out of bounds
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Sub-index into a note collection is not valid for that collection
    #[error("Invalid sub-index {0} for note collection")]
    InvalidIndex(usize),

    // ------------------------------------------------------------------
    // State conflicts
    // ------------------------------------------------------------------
    /// Requested tie transition cannot be represented
    #[error("Invalid tie state transition")]
    InvalidTieState,

    /// Clef query before any clef is in effect
    #[error("No clef specified for this position")]
    NoClefSpecified,

    /// Tie crosses a measure boundary but there is nothing to tie to
    #[error("No next note to tie to")]
    NoNextNoteToTie,

    // ------------------------------------------------------------------
    // Construction errors
    // ------------------------------------------------------------------
    /// Tuplets group between 2 and 7 notes
    #[error("Invalid tuplet grouping size: {0} (must be 2-7)")]
    InvalidGroupingSize(usize),

    /// Tuplets cannot contain rests
    #[error("Rests are not allowed in a tuplet")]
    RestsNotAllowed,

    /// Note durations inside a tuplet must match its base duration
    #[error("Note duration does not match the tuplet duration")]
    DurationMismatch,

    /// Tuplet ratio is zero or 1:1
    #[error("Invalid tuplet ratio {count}:{in_space_of}")]
    InvalidTupletRatio { count: usize, in_space_of: usize },

    /// Dot count too large for the tick resolution
    #[error("Invalid dot count: {0}")]
    InvalidDotCount(u8),

    // ------------------------------------------------------------------
    // Structural errors
    // ------------------------------------------------------------------
    /// Point operation landed inside a tuplet
    #[error("Index {0} is inside a tuplet")]
    IndexInsideTuplet(usize),

    /// Range operation cuts through a tuplet
    #[error("Range does not completely cover the tuplets it touches")]
    TupletNotCompletelyCovered,

    /// Expected a tuplet at the given flat index
    #[error("No tuplet at index {0}")]
    NoTupletAtIndex(usize),

    /// Repeated measure instances are read-only views
    #[error("A repeated measure cannot be modified")]
    RepeatedMeasureCannotBeModified,

    /// Ties cannot start or end on a repeated measure instance
    #[error("A repeated measure cannot have a tie")]
    RepeatedMeasureCannotHaveTie,

    /// Measure repeats play at least once
    #[error("Invalid repeat count: {0}")]
    InvalidRepeatCount(usize),

    /// Measure repeats need at least one measure
    #[error("No measures to repeat")]
    NoMeasuresToRepeat,

    /// Time signature denominator does not map to a supported duration
    #[error("Invalid time signature denominator: {0}")]
    InvalidTimeSignatureDenominator(u32),

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------
    /// Derived index and content disagree (indicates a bug)
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl NotationError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        NotationError::IndexOutOfRange { index, len }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("notation engine internal error: {}", message);
        NotationError::InternalError(message)
    }
}
