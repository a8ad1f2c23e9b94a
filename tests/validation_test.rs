// Measure fill-state validation through the public API

use std::collections::BTreeMap;

use notation_engine::validation::{available_durations, measure_ticks};
use notation_engine::{
    completion_state, CompletionState, Duration, DurationValue, Measure, NotationError, Note,
    TimeSignature, Tone, Tuplet,
};

fn pitched(duration: Duration) -> Note {
    Note::new(duration, vec![Tone::new(2, 0, 5)])
}

fn measure_of(time_signature: TimeSignature, durations: &[Duration]) -> Measure {
    let mut measure = Measure::new(time_signature);
    for duration in durations {
        measure.append(pitched(*duration), 0).unwrap();
    }
    measure
}

#[test]
fn test_four_quarters_fill_common_time() {
    let measure = measure_of(TimeSignature::default(), &[Duration::QUARTER; 4]);
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
}

#[test]
fn test_two_quarters_need_a_half() {
    let measure = measure_of(TimeSignature::default(), &[Duration::QUARTER; 2]);
    assert_eq!(
        completion_state(&measure).unwrap(),
        vec![CompletionState::NotFull {
            available: BTreeMap::from([(Duration::HALF, 1)])
        }]
    );
}

#[test]
fn test_rests_count_toward_fill() {
    let mut measure = measure_of(TimeSignature::default(), &[Duration::HALF]);
    measure.append(Note::rest(Duration::HALF), 0).unwrap();
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
}

#[test]
fn test_compound_meter_with_dotted_half() {
    let dotted_half = Duration::new(DurationValue::Half, 1).unwrap();
    let measure = measure_of(TimeSignature::new(6, 8, 90), &[dotted_half]);
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
}

#[test]
fn test_irrational_denominator_rounds_down() {
    let time_signature = TimeSignature::new(4, 6, 120);
    assert_eq!(
        measure_ticks(&time_signature).unwrap(),
        measure_ticks(&TimeSignature::default()).unwrap()
    );
    let measure = measure_of(time_signature, &[Duration::QUARTER; 4]);
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
}

#[test]
fn test_invalid_denominator_is_an_error() {
    let measure = Measure::new(TimeSignature::new(3, 0, 120));
    assert_eq!(
        completion_state(&measure),
        Err(NotationError::InvalidTimeSignatureDenominator(0))
    );
}

#[test]
fn test_overflow_starts_at_first_note_of_overflowing_tuplet() {
    let mut measure = measure_of(TimeSignature::default(), &[Duration::QUARTER; 3]);
    let quarter_triplet = Tuplet::new(vec![pitched(Duration::QUARTER); 3]).unwrap();
    measure.append(quarter_triplet, 0).unwrap();
    measure.append(pitched(Duration::QUARTER), 0).unwrap();

    assert_eq!(
        completion_state(&measure).unwrap(),
        vec![CompletionState::Overfilled { overflow: 3..7 }]
    );
}

#[test]
fn test_unfillable_remainder_is_invalid() {
    // a dotted 256th leaves a remainder shorter than any duration
    let dotted = Duration::new(DurationValue::TwoFiftySixth, 1).unwrap();
    let measure = measure_of(TimeSignature::default(), &[dotted]);
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Invalid]);
}

#[test]
fn test_each_voice_has_its_own_state() {
    let mut measure = measure_of(TimeSignature::new(3, 4, 120), &[Duration::QUARTER; 3]);
    measure.append(pitched(Duration::WHOLE), 1).unwrap();
    measure.append(pitched(Duration::EIGHTH), 2).unwrap();

    let states = completion_state(&measure).unwrap();
    assert_eq!(states.len(), 3);
    assert_eq!(states[0], CompletionState::Full);
    assert_eq!(states[1], CompletionState::Overfilled { overflow: 0..1 });
    assert_eq!(
        states[2],
        CompletionState::NotFull {
            available: BTreeMap::from([(Duration::HALF, 1), (Duration::EIGHTH, 1)])
        }
    );
}

#[test]
fn test_suggested_durations_complete_the_measure() {
    let time_signature = TimeSignature::new(7, 8, 120);
    let mut measure = measure_of(time_signature, &[Duration::SIXTEENTH]);
    let CompletionState::NotFull { available } = completion_state(&measure).unwrap().remove(0) else {
        panic!("expected a partially filled measure");
    };

    for (duration, count) in &available {
        for _ in 0..*count {
            measure.append(pitched(*duration), 0).unwrap();
        }
    }
    assert_eq!(completion_state(&measure).unwrap(), vec![CompletionState::Full]);
    assert_eq!(measure.ticks(0).unwrap(), measure_ticks(&time_signature).unwrap());
}

#[test]
fn test_available_durations_for_empty_gap() {
    assert_eq!(available_durations(0), Some(BTreeMap::new()));
}
