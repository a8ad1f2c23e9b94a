// Staff: measure repeats, cross-measure ties and clef carrying

use notation_engine::{
    Clef, Duration, Instrument, Measure, MeasureLocation, MeasureRepeat, NotationError, Note,
    NotesHolder, Staff, Tie, TimeSignature, Tone,
};

/// Helper to create a measure of `count` quarter notes
fn quarters(count: usize) -> Measure {
    let mut measure = Measure::new(TimeSignature::default());
    for step in 0..count {
        measure
            .append(Note::new(Duration::QUARTER, vec![Tone::new(step as u8, 0, 4)]), 0)
            .unwrap();
    }
    measure
}

/// 1 plain measure, then two measures repeated three times
fn repeat_staff() -> Staff {
    let mut staff = Staff::new(Clef::Treble, Instrument::new("Violin"));
    staff.append_measure(quarters(4));
    staff
        .append_repeat(MeasureRepeat::new(vec![quarters(1), quarters(2)], 3).unwrap())
        .unwrap();
    staff
}

#[test]
fn test_repeat_expansion_indices() {
    let staff = repeat_staff();
    assert_eq!(staff.measure_count(), 7);
    assert_eq!(staff.location(0).unwrap(), MeasureLocation { holder: 0, repeat: None });
    for (at, sub) in (1..7).zip(0..6) {
        assert_eq!(
            staff.location(at).unwrap(),
            MeasureLocation { holder: 1, repeat: Some(sub) },
            "measure {}",
            at
        );
    }

    // second measure of the repeat, second pass
    let fourth = staff.measure(4).unwrap();
    assert!(fourth.is_repeated());
    assert_eq!(fourth.measure().note_count(0).unwrap(), 2);

    let note_counts: Vec<usize> = staff
        .measures()
        .iter()
        .map(|m| m.measure().note_count(0).unwrap())
        .collect();
    assert_eq!(note_counts, vec![4, 1, 2, 1, 2, 1, 2]);
    assert!(matches!(
        staff.measure(7),
        Err(NotationError::IndexOutOfRange { index: 7, len: 7 })
    ));
}

#[test]
fn test_repeated_measure_is_read_only() {
    let mut staff = repeat_staff();
    assert!(staff.measure_mut(2).is_ok());
    assert_eq!(
        staff.measure_mut(4).map(|_| ()),
        Err(NotationError::RepeatedMeasureCannotBeModified)
    );
    assert_eq!(
        staff.replace_measure(6, quarters(3)),
        Err(NotationError::RepeatedMeasureCannotBeModified)
    );

    // editing the first pass shows up in every pass
    staff.replace_measure(2, quarters(3)).unwrap();
    assert_eq!(staff.measure(4).unwrap().measure().note_count(0).unwrap(), 3);
    assert_eq!(staff.measure(6).unwrap().measure().note_count(0).unwrap(), 3);
}

#[test]
fn test_tie_across_measure_boundary() {
    let mut staff = Staff::new(Clef::Treble, Instrument::default());
    staff.append_measure(quarters(4));
    staff.append_measure(quarters(4));

    staff.start_tie_from_note(3, 0, 0).unwrap();
    assert_eq!(staff.note(3, 0, 0).unwrap().tie, Some(Tie::Begin));
    assert_eq!(staff.note(0, 1, 0).unwrap().tie, Some(Tie::End));

    // chaining from the tied-to note
    staff.start_tie_from_note(0, 1, 0).unwrap();
    assert_eq!(staff.note(0, 1, 0).unwrap().tie, Some(Tie::BeginAndEnd));
    assert_eq!(staff.note(1, 1, 0).unwrap().tie, Some(Tie::End));
}

#[test]
fn test_no_next_note_to_tie() {
    let mut staff = Staff::new(Clef::Treble, Instrument::default());
    staff.append_measure(quarters(2));
    assert_eq!(staff.start_tie_from_note(1, 0, 0), Err(NotationError::NoNextNoteToTie));

    staff.append_measure(Measure::new(TimeSignature::default()));
    assert_eq!(staff.start_tie_from_note(1, 0, 0), Err(NotationError::NoNextNoteToTie));
    assert_eq!(staff.note(1, 0, 0).unwrap().tie, None);
}

#[test]
fn test_repeated_measure_cannot_have_tie() {
    let mut staff = repeat_staff();
    // last note of the first pass would tie into the second pass
    assert_eq!(
        staff.start_tie_from_note(1, 2, 0),
        Err(NotationError::RepeatedMeasureCannotHaveTie)
    );
    assert_eq!(
        staff.start_tie_from_note(0, 3, 0),
        Err(NotationError::RepeatedMeasureCannotHaveTie)
    );
    assert_eq!(staff.note(1, 2, 0).unwrap().tie, None);

    // inside the first pass ties are fine
    staff.start_tie_from_note(0, 2, 0).unwrap();
    assert_eq!(staff.note(1, 4, 0).unwrap().tie, Some(Tie::End));
}

#[test]
fn test_remove_tie_across_boundary_from_either_side() {
    let mut staff = Staff::new(Clef::Treble, Instrument::default());
    staff.append_measure(quarters(2));
    staff.append_measure(quarters(2));

    staff.start_tie_from_note(1, 0, 0).unwrap();
    staff.remove_tie_from_note(1, 0, 0).unwrap();
    assert_eq!(staff.note(1, 0, 0).unwrap().tie, None);
    assert_eq!(staff.note(0, 1, 0).unwrap().tie, None);

    staff.start_tie_from_note(1, 0, 0).unwrap();
    staff.remove_tie_from_note(0, 1, 0).unwrap();
    assert_eq!(staff.note(1, 0, 0).unwrap().tie, None);
    assert_eq!(staff.note(0, 1, 0).unwrap().tie, None);

    // removing where there is no tie changes nothing
    staff.remove_tie_from_note(0, 0, 0).unwrap();
    assert_eq!(staff.note(0, 0, 0).unwrap().tie, None);
}

#[test]
fn test_clef_carries_through_repeat_first_pass() {
    let mut staff = repeat_staff();
    staff.change_clef(Clef::Bass, 2, 0, 0).unwrap();

    for at in 1..7 {
        let measure = staff.measure(at).unwrap().measure();
        assert_eq!(measure.clef(0, 0), Ok(Clef::Bass), "measure {}", at);
    }
}

#[test]
fn test_repeat_measures_then_remove() {
    let mut staff = Staff::new(Clef::Bass, Instrument::new("Cello"));
    for count in 1..=3 {
        staff.append_measure(quarters(count));
    }
    staff.repeat_measures(0..2, 2).unwrap();
    assert_eq!(staff.measure_count(), 5);
    assert!(matches!(staff.holders()[0], NotesHolder::Repeat(_)));

    assert_eq!(
        staff.repeat_measures(0..1, 0),
        Err(NotationError::RepeatedMeasureCannotBeModified)
    );
    assert_eq!(staff.repeat_measures(4..5, 0), Err(NotationError::InvalidRepeatCount(0)));

    // emptying the repeat removes it
    staff.remove_measure(0).unwrap();
    assert_eq!(staff.measure_count(), 3);
    staff.remove_measure(0).unwrap();
    assert_eq!(staff.measure_count(), 1);
    assert_eq!(staff.holders().len(), 1);
    assert_eq!(staff.measure(0).unwrap().measure().note_count(0).unwrap(), 3);
}

#[test]
fn test_deserialized_staff_rebuilds_index() {
    let staff = repeat_staff();
    let json = serde_json::to_string(&staff).unwrap();
    let restored: Staff = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, staff);
    assert_eq!(restored.measure_count(), 7);
    assert!(restored.measure(5).unwrap().is_repeated());
}

#[test]
fn test_deserialize_rejects_empty_repeat() {
    let json = r#"{"clef":"Treble","instrument":{"name":""},"holders":[{"Repeat":{"repeat_count":2,"measures":[]}}]}"#;
    assert!(serde_json::from_str::<Staff>(json).is_err());
}

#[test]
fn test_insert_between_plain_measure_and_repeat() {
    let mut staff = Staff::new(Clef::Treble, Instrument::default());
    staff.append_measure(quarters(4));
    staff
        .append_repeat(MeasureRepeat::new(vec![quarters(1)], 2).unwrap())
        .unwrap();

    staff.insert_measure(quarters(3), 1).unwrap();
    assert_eq!(staff.holders().len(), 3);
    assert!(matches!(staff.holders()[1], NotesHolder::Measure(_)));
    assert_eq!(staff.measure_count(), 4);
    assert_eq!(staff.measure(1).unwrap().measure().note_count(0).unwrap(), 3);
    assert_eq!(staff.location(2).unwrap(), MeasureLocation { holder: 2, repeat: Some(0) });
}

#[test]
fn test_insert_before_leading_repeat() {
    let mut staff = Staff::new(Clef::Treble, Instrument::default());
    staff
        .append_repeat(MeasureRepeat::new(vec![quarters(1)], 2).unwrap())
        .unwrap();

    staff.insert_measure(quarters(2), 0).unwrap();
    assert!(matches!(staff.holders()[0], NotesHolder::Measure(_)));
    assert!(matches!(staff.holders()[1], NotesHolder::Repeat(_)));
    assert_eq!(staff.measure_count(), 3);
    assert!(!staff.measure(0).unwrap().is_repeated());
}

#[test]
fn test_insert_inside_repeat_first_pass_joins_group() {
    let mut staff = repeat_staff();
    // between the repeat's two stored measures
    staff.insert_measure(quarters(3), 2).unwrap();
    assert_eq!(staff.holders().len(), 2);
    assert_eq!(staff.measure_count(), 10);
    let note_counts: Vec<usize> = staff
        .measures()
        .iter()
        .map(|m| m.measure().note_count(0).unwrap())
        .collect();
    assert_eq!(note_counts, vec![4, 1, 3, 2, 1, 3, 2, 1, 3, 2]);
}

#[test]
fn test_remove_tie_on_repeated_pass_is_a_modification() {
    let mut staff = repeat_staff();
    staff.start_tie_from_note(0, 2, 0).unwrap();
    assert_eq!(
        staff.remove_tie_from_note(0, 4, 0),
        Err(NotationError::RepeatedMeasureCannotBeModified)
    );
    assert_eq!(staff.note(0, 2, 0).unwrap().tie, Some(Tie::Begin));

    staff.remove_tie_from_note(0, 2, 0).unwrap();
    assert_eq!(staff.note(1, 4, 0).unwrap().tie, None);
}
