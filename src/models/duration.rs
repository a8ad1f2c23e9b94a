//! Symbolic durations and tick arithmetic
//!
//! A tick is the smallest exact unit of musical time. All timing math in the
//! crate is done in ticks; tuplet subdivisions use exact fractions of ticks.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::{NotationError, Result};

/// Integer tick count
pub type Ticks = u64;

/// Exact fractional tick count (tuplet subdivisions)
pub type TickFraction = Ratio<Ticks>;

/// Ticks per quarter note (2^12)
pub const TICKS_PER_QUARTER: Ticks = 4096;

/// Largest dot count that keeps every value an exact tick count.
/// A 1/256 note is 64 ticks, so six successive halvings stay integral.
pub const MAX_DOT_COUNT: u8 = 6;

/// Base note values, longest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationValue {
    Large,
    Long,
    DoubleWhole,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneTwentyEighth,
    TwoFiftySixth,
}

impl DurationValue {
    /// All values, longest first
    pub const ALL: [DurationValue; 12] = [
        DurationValue::Large,
        DurationValue::Long,
        DurationValue::DoubleWhole,
        DurationValue::Whole,
        DurationValue::Half,
        DurationValue::Quarter,
        DurationValue::Eighth,
        DurationValue::Sixteenth,
        DurationValue::ThirtySecond,
        DurationValue::SixtyFourth,
        DurationValue::OneTwentyEighth,
        DurationValue::TwoFiftySixth,
    ];

    /// Undotted tick count
    pub const fn ticks(self) -> Ticks {
        match self {
            DurationValue::Large => TICKS_PER_QUARTER * 32,
            DurationValue::Long => TICKS_PER_QUARTER * 16,
            DurationValue::DoubleWhole => TICKS_PER_QUARTER * 8,
            DurationValue::Whole => TICKS_PER_QUARTER * 4,
            DurationValue::Half => TICKS_PER_QUARTER * 2,
            DurationValue::Quarter => TICKS_PER_QUARTER,
            DurationValue::Eighth => TICKS_PER_QUARTER / 2,
            DurationValue::Sixteenth => TICKS_PER_QUARTER / 4,
            DurationValue::ThirtySecond => TICKS_PER_QUARTER / 8,
            DurationValue::SixtyFourth => TICKS_PER_QUARTER / 16,
            DurationValue::OneTwentyEighth => TICKS_PER_QUARTER / 32,
            DurationValue::TwoFiftySixth => TICKS_PER_QUARTER / 64,
        }
    }

    /// Value for a note that is `1/denominator` of a whole note.
    /// Only powers of two from 1 to 256 map to a value.
    pub fn from_denominator(denominator: u32) -> Option<DurationValue> {
        match denominator {
            1 => Some(DurationValue::Whole),
            2 => Some(DurationValue::Half),
            4 => Some(DurationValue::Quarter),
            8 => Some(DurationValue::Eighth),
            16 => Some(DurationValue::Sixteenth),
            32 => Some(DurationValue::ThirtySecond),
            64 => Some(DurationValue::SixtyFourth),
            128 => Some(DurationValue::OneTwentyEighth),
            256 => Some(DurationValue::TwoFiftySixth),
            _ => None,
        }
    }
}

/// Note value plus augmentation dots
///
/// Ordering and hashing are by `(value, dot_count)`, so longer values sort
/// first. The dot count never exceeds [`MAX_DOT_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DurationRecord")]
pub struct Duration {
    value: DurationValue,
    dot_count: u8,
}

/// Unvalidated duration as read by serde
#[derive(Deserialize)]
struct DurationRecord {
    value: DurationValue,
    #[serde(default)]
    dot_count: u8,
}

impl TryFrom<DurationRecord> for Duration {
    type Error = NotationError;

    fn try_from(record: DurationRecord) -> Result<Self> {
        Duration::new(record.value, record.dot_count)
    }
}

impl Duration {
    pub const LARGE: Duration = Duration::plain(DurationValue::Large);
    pub const LONG: Duration = Duration::plain(DurationValue::Long);
    pub const DOUBLE_WHOLE: Duration = Duration::plain(DurationValue::DoubleWhole);
    pub const WHOLE: Duration = Duration::plain(DurationValue::Whole);
    pub const HALF: Duration = Duration::plain(DurationValue::Half);
    pub const QUARTER: Duration = Duration::plain(DurationValue::Quarter);
    pub const EIGHTH: Duration = Duration::plain(DurationValue::Eighth);
    pub const SIXTEENTH: Duration = Duration::plain(DurationValue::Sixteenth);
    pub const THIRTY_SECOND: Duration = Duration::plain(DurationValue::ThirtySecond);
    pub const SIXTY_FOURTH: Duration = Duration::plain(DurationValue::SixtyFourth);
    pub const ONE_TWENTY_EIGHTH: Duration = Duration::plain(DurationValue::OneTwentyEighth);
    pub const TWO_FIFTY_SIXTH: Duration = Duration::plain(DurationValue::TwoFiftySixth);

    /// Create a dotted duration
    pub fn new(value: DurationValue, dot_count: u8) -> Result<Self> {
        if dot_count > MAX_DOT_COUNT {
            return Err(NotationError::InvalidDotCount(dot_count));
        }
        Ok(Self { value, dot_count })
    }

    /// Undotted duration
    pub const fn plain(value: DurationValue) -> Self {
        Self {
            value,
            dot_count: 0,
        }
    }

    pub fn value(&self) -> DurationValue {
        self.value
    }

    pub fn dot_count(&self) -> u8 {
        self.dot_count
    }

    /// Tick count: each dot adds half of the previous addend
    pub fn ticks(&self) -> Ticks {
        let mut addend = self.value.ticks();
        let mut total = addend;
        for _ in 0..self.dot_count {
            addend /= 2;
            total += addend;
        }
        total
    }

    /// Tick count as an exact fraction
    pub fn exact_ticks(&self) -> TickFraction {
        TickFraction::from_integer(self.ticks())
    }
}

impl From<DurationValue> for Duration {
    fn from(value: DurationValue) -> Self {
        Duration::plain(value)
    }
}
