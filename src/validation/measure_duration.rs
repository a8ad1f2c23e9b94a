//! Measure fill-state validation
//!
//! Decides for each voice whether it exactly fills the measure's time
//! signature, falls short (and which durations would complete it), or runs
//! over. All arithmetic is in integer ticks; tuplets always span a whole number
//! of ticks so no fractions are needed here.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{NotationError, Result};
use crate::measure::Measure;
use crate::models::{Duration, DurationValue, Ticks, TimeSignature};

/// Fill state of one voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionState {
    Full,
    /// Durations that would exactly complete the voice
    NotFull { available: BTreeMap<Duration, usize> },
    /// Flat note indices from the first note that runs past the bar line
    Overfilled { overflow: Range<usize> },
    /// Remaining ticks cannot be written with supported durations
    Invalid,
}

/// Undotted durations a gap may be filled with, shortest first
const FILL_DURATIONS: [DurationValue; 12] = [
    DurationValue::TwoFiftySixth,
    DurationValue::OneTwentyEighth,
    DurationValue::SixtyFourth,
    DurationValue::ThirtySecond,
    DurationValue::Sixteenth,
    DurationValue::Eighth,
    DurationValue::Quarter,
    DurationValue::Half,
    DurationValue::Whole,
    DurationValue::DoubleWhole,
    DurationValue::Long,
    DurationValue::Large,
];

/// Beat unit of a time signature
///
/// The denominator is rounded down to a power of two, so an irrational
/// signature such as 4/6 counts in quarters.
pub fn base_duration(time_signature: &TimeSignature) -> Result<Duration> {
    let denominator = time_signature.denominator;
    if denominator == 0 {
        return Err(NotationError::InvalidTimeSignatureDenominator(denominator));
    }
    let rounded = 1u32 << (u32::BITS - 1 - denominator.leading_zeros());
    DurationValue::from_denominator(rounded)
        .map(Duration::plain)
        .ok_or(NotationError::InvalidTimeSignatureDenominator(denominator))
}

/// Ticks that fill one measure of `time_signature`
pub fn measure_ticks(time_signature: &TimeSignature) -> Result<Ticks> {
    Ok(time_signature.numerator as Ticks * base_duration(time_signature)?.ticks())
}

/// Fill state of every voice in `measure`
pub fn completion_state(measure: &Measure) -> Result<Vec<CompletionState>> {
    let budget = measure_ticks(&measure.time_signature())?;
    (0..measure.voice_count())
        .map(|voice| voice_state(measure, voice, budget))
        .collect()
}

fn voice_state(measure: &Measure, voice: usize, budget: Ticks) -> Result<CompletionState> {
    let mut total: Ticks = 0;
    let mut overflow_start = None;
    for (collection, item) in measure.voice(voice)?.iter().enumerate() {
        total += item.ticks();
        if total > budget && overflow_start.is_none() {
            overflow_start = Some(collection);
        }
    }

    if total == budget {
        return Ok(CompletionState::Full);
    }
    if let Some(collection) = overflow_start {
        let index = measure.voice_index(voice)?;
        let start = index.start_of(collection).ok_or_else(|| {
            NotationError::internal(format!("no flat index for collection {}", collection))
        })?;
        return Ok(CompletionState::Overfilled {
            overflow: start..index.len(),
        });
    }
    Ok(match available_durations(budget - total) {
        Some(available) => CompletionState::NotFull { available },
        None => {
            log::warn!(
                "voice {} is {} ticks short, which no duration can fill",
                voice,
                budget - total
            );
            CompletionState::Invalid
        }
    })
}

/// Greedy largest-fit decomposition of `ticks` into undotted durations
///
/// Returns `None` if a remainder smaller than the shortest duration is left.
pub fn available_durations(ticks: Ticks) -> Option<BTreeMap<Duration, usize>> {
    let mut remaining = ticks;
    let mut available = BTreeMap::new();
    while remaining > 0 {
        let fitting = FILL_DURATIONS.partition_point(|value| value.ticks() <= remaining);
        let value = FILL_DURATIONS[fitting.checked_sub(1)?];
        let count = remaining / value.ticks();
        available.insert(Duration::plain(value), count as usize);
        remaining -= count * value.ticks();
    }
    Some(available)
}
