//! Staves: ordered measures and measure repeats
//!
//! A staff stores plain measures and [`MeasureRepeat`] groups ("notes
//! holders"). Global measure indices count played measures, so a repeat of
//! two measures played three times covers six indices. The mapping from
//! global index to holder is a derived index rebuilt on every holder change.

pub mod measure_repeat;

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{NotationError, Result};
use crate::measure::Measure;
use crate::models::{Clef, Instrument, Note, Tie};

pub use measure_repeat::MeasureRepeat;

/// Content stored at the staff level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotesHolder {
    Measure(Measure),
    Repeat(MeasureRepeat),
}

impl NotesHolder {
    /// Played measures covered by this holder
    pub fn measure_count(&self) -> usize {
        match self {
            NotesHolder::Measure(_) => 1,
            NotesHolder::Repeat(repeat) => repeat.measure_count(),
        }
    }
}

/// A measure as seen through the staff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffMeasure<'a> {
    /// Stored measure (plain, or first pass of a repeat)
    Measure(&'a Measure),
    /// Later pass of a repeat; read-only
    Repeated(&'a Measure),
}

impl<'a> StaffMeasure<'a> {
    pub fn measure(&self) -> &'a Measure {
        match self {
            StaffMeasure::Measure(measure) | StaffMeasure::Repeated(measure) => measure,
        }
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self, StaffMeasure::Repeated(_))
    }
}

/// Where a global measure index lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureLocation {
    pub holder: usize,
    /// Position in the repeat's expansion; `None` for a plain measure
    pub repeat: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StaffRecord")]
pub struct Staff {
    clef: Clef,
    instrument: Instrument,
    holders: Vec<NotesHolder>,
    #[serde(skip)]
    index: Vec<MeasureLocation>,
}

#[derive(Deserialize)]
struct StaffRecord {
    clef: Clef,
    instrument: Instrument,
    holders: Vec<NotesHolder>,
}

impl From<StaffRecord> for Staff {
    fn from(record: StaffRecord) -> Self {
        let mut staff = Staff {
            clef: record.clef,
            instrument: record.instrument,
            holders: record.holders,
            index: Vec::new(),
        };
        staff.rebuild();
        staff
    }
}

impl Staff {
    pub fn new(clef: Clef, instrument: Instrument) -> Self {
        Self {
            clef,
            instrument,
            holders: Vec::new(),
            index: Vec::new(),
        }
    }

    pub fn clef(&self) -> Clef {
        self.clef
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn holders(&self) -> &[NotesHolder] {
        &self.holders
    }

    /// Played measures, counting every repeat pass
    pub fn measure_count(&self) -> usize {
        self.index.len()
    }

    pub fn location(&self, at: usize) -> Result<MeasureLocation> {
        self.index
            .get(at)
            .copied()
            .ok_or_else(|| NotationError::out_of_range(at, self.index.len()))
    }

    pub fn measure(&self, at: usize) -> Result<StaffMeasure<'_>> {
        let location = self.location(at)?;
        match (&self.holders[location.holder], location.repeat) {
            (NotesHolder::Measure(measure), None) => Ok(StaffMeasure::Measure(measure)),
            (NotesHolder::Repeat(repeat), Some(sub)) => repeat.measure(sub),
            _ => Err(NotationError::internal(format!(
                "measure index entry {} does not match holder kind",
                at
            ))),
        }
    }

    /// Mutable access to a stored measure
    pub fn measure_mut(&mut self, at: usize) -> Result<&mut Measure> {
        let location = self.location(at)?;
        match (&mut self.holders[location.holder], location.repeat) {
            (NotesHolder::Measure(measure), None) => Ok(measure),
            (NotesHolder::Repeat(repeat), Some(sub)) => repeat.measure_mut(sub),
            _ => Err(NotationError::internal(format!(
                "measure index entry {} does not match holder kind",
                at
            ))),
        }
    }

    /// Every played measure in order
    pub fn measures(&self) -> Vec<StaffMeasure<'_>> {
        (0..self.measure_count())
            .filter_map(|at| self.measure(at).ok())
            .collect()
    }

    /// Note at `note` in `voice` of measure `at`
    pub fn note(&self, note: usize, at: usize, voice: usize) -> Result<&Note> {
        self.measure(at)?.measure().note(note, voice)
    }

    // ------------------------------------------------------------------
    // Holder editing
    // ------------------------------------------------------------------

    /// Clef a newly appended measure starts with
    fn trailing_clef(&self) -> Clef {
        self.measure_count()
            .checked_sub(1)
            .and_then(|last| self.measure(last).ok())
            .and_then(|measure| measure.measure().last_clef())
            .unwrap_or(self.clef)
    }

    pub fn append_measure(&mut self, mut measure: Measure) {
        measure.change_first_clef_if_needed(self.trailing_clef());
        self.holders.push(NotesHolder::Measure(measure));
        self.rebuild();
    }

    pub fn append_repeat(&mut self, mut repeat: MeasureRepeat) -> Result<()> {
        let clef = self.trailing_clef();
        repeat.measure_mut(0)?.change_first_clef_if_needed(clef);
        self.holders.push(NotesHolder::Repeat(repeat));
        self.rebuild();
        Ok(())
    }

    /// Insert before global measure `at` (`at == measure_count()` appends)
    ///
    /// At the first measure of a repeat the new measure goes in front of the
    /// repeat; further inside the first pass it joins the repeated group.
    pub fn insert_measure(&mut self, measure: Measure, at: usize) -> Result<()> {
        if at == self.measure_count() {
            self.append_measure(measure);
            return Ok(());
        }
        let location = self.location(at)?;
        match (&mut self.holders[location.holder], location.repeat) {
            (NotesHolder::Measure(_), None) | (NotesHolder::Repeat(_), Some(0)) => {
                self.holders.insert(location.holder, NotesHolder::Measure(measure));
            }
            (NotesHolder::Repeat(repeat), Some(sub)) => repeat.insert_measure(measure, sub)?,
            _ => return Err(NotationError::internal("measure index does not match holder kind")),
        }
        self.rebuild();
        Ok(())
    }

    pub fn replace_measure(&mut self, at: usize, measure: Measure) -> Result<()> {
        *self.measure_mut(at)? = measure;
        Ok(())
    }

    /// Remove global measure `at`; removing the last measure of a repeat
    /// removes the repeat
    pub fn remove_measure(&mut self, at: usize) -> Result<()> {
        let location = self.location(at)?;
        match (&mut self.holders[location.holder], location.repeat) {
            (NotesHolder::Measure(_), None) => {
                self.holders.remove(location.holder);
            }
            (NotesHolder::Repeat(repeat), Some(sub)) => {
                if sub >= repeat.measures().len() {
                    return Err(NotationError::RepeatedMeasureCannotBeModified);
                }
                if repeat.measures().len() == 1 {
                    self.holders.remove(location.holder);
                } else {
                    repeat.remove_measure(sub)?;
                }
            }
            _ => return Err(NotationError::internal("measure index does not match holder kind")),
        }
        self.rebuild();
        Ok(())
    }

    /// Group plain measures `range` into a repeat played `repeat_count` times
    pub fn repeat_measures(&mut self, range: Range<usize>, repeat_count: usize) -> Result<()> {
        if range.is_empty() || range.end > self.measure_count() {
            return Err(NotationError::out_of_range(range.end, self.measure_count()));
        }
        let mut measures = Vec::with_capacity(range.len());
        for at in range.clone() {
            match self.measure(at)? {
                StaffMeasure::Measure(measure) if self.index[at].repeat.is_none() => {
                    measures.push(measure.clone())
                }
                _ => return Err(NotationError::RepeatedMeasureCannotBeModified),
            }
        }
        let repeat = MeasureRepeat::new(measures, repeat_count)?;

        let first = self.index[range.start].holder;
        let last = self.index[range.end - 1].holder;
        self.holders
            .splice(first..=last, std::iter::once(NotesHolder::Repeat(repeat)));
        self.rebuild();
        log::debug!("repeated measures {:?} x{}", range, repeat_count);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Clefs and ties across measures
    // ------------------------------------------------------------------

    /// Change clef inside measure `at` and carry it into following measures
    /// that have no clef change of their own
    pub fn change_clef(&mut self, clef: Clef, note: usize, at: usize, voice: usize) -> Result<()> {
        let measure = self.measure_mut(at)?;
        measure.change_clef(clef, note, voice)?;
        let last_note = measure.note_count(voice)? - 1;
        let trailing = measure.clef(last_note, voice)?;

        for next in at + 1..self.measure_count() {
            // later passes follow their stored measure
            if self.measure(next)?.is_repeated() {
                continue;
            }
            if !self.measure_mut(next)?.change_first_clef_if_needed(trailing) {
                break;
            }
        }
        Ok(())
    }

    /// Measure that may carry a tie
    fn tie_target(&self, at: usize) -> Result<&Measure> {
        match self.measure(at)? {
            StaffMeasure::Measure(measure) => Ok(measure),
            StaffMeasure::Repeated(_) => Err(NotationError::RepeatedMeasureCannotHaveTie),
        }
    }

    /// Neighbouring measure holding the other end of a cross-measure tie
    fn tie_partner(&self, at: usize, voice: usize) -> Option<&Measure> {
        let measure = self.tie_target(at).ok()?;
        (measure.note_count(voice).ok()? > 0).then_some(measure)
    }

    /// Tie `note` to the following note, crossing into the next measure when
    /// `note` is the last of its measure
    pub fn start_tie_from_note(&mut self, note: usize, at: usize, voice: usize) -> Result<()> {
        let first = self.tie_target(at)?;
        let note_count = first.note_count(voice)?;
        if note >= note_count {
            return Err(NotationError::out_of_range(note, note_count));
        }
        if note + 1 < note_count {
            return self.measure_mut(at)?.start_tie(note, voice);
        }

        let next = at + 1;
        if next >= self.measure_count() {
            return Err(NotationError::NoNextNoteToTie);
        }
        let second = self.tie_target(next)?;
        if second.note_count(voice).unwrap_or(0) == 0 {
            return Err(NotationError::NoNextNoteToTie);
        }

        let mut first = first.clone();
        let mut second = second.clone();
        first.modify_tie(note, Some(Tie::Begin), voice)?;
        second.modify_tie(0, Some(Tie::End), voice)?;
        *self.measure_mut(at)? = first;
        *self.measure_mut(next)? = second;
        log::debug!("tied measure {} note {} to measure {}", at, note, next);
        Ok(())
    }

    /// Remove the tie at `note`, clearing its partner even across a measure
    /// boundary
    ///
    /// Repeated passes are read-only, so removal there fails with
    /// `RepeatedMeasureCannotBeModified`.
    pub fn remove_tie_from_note(&mut self, note: usize, at: usize, voice: usize) -> Result<()> {
        let measure = match self.measure(at)? {
            StaffMeasure::Measure(measure) => measure,
            StaffMeasure::Repeated(_) => return Err(NotationError::RepeatedMeasureCannotBeModified),
        };
        let note_count = measure.note_count(voice)?;
        let Some(tie) = measure.note(note, voice)?.tie else {
            return Ok(());
        };

        let mut updated = measure.clone();
        updated.remove_tie(note, voice)?;

        let partner = if tie.has_begin() && note + 1 == note_count {
            self.tie_partner(at + 1, voice)
                .map(|next| -> Result<(usize, Measure)> {
                    let mut next = next.clone();
                    next.remove_tie_end(0, voice)?;
                    Ok((at + 1, next))
                })
                .transpose()?
        } else if !tie.has_begin() && note == 0 && at > 0 {
            self.tie_partner(at - 1, voice)
                .map(|previous| -> Result<(usize, Measure)> {
                    let mut previous = previous.clone();
                    let last = previous.note_count(voice)? - 1;
                    previous.remove_tie_begin(last, voice)?;
                    Ok((at - 1, previous))
                })
                .transpose()?
        } else {
            None
        };

        *self.measure_mut(at)? = updated;
        if let Some((partner_at, partner)) = partner {
            *self.measure_mut(partner_at)? = partner;
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        self.index = self
            .holders
            .iter()
            .enumerate()
            .flat_map(|(holder, content)| {
                let repeated = matches!(content, NotesHolder::Repeat(_));
                (0..content.measure_count()).map(move |sub| MeasureLocation {
                    holder,
                    repeat: repeated.then_some(sub),
                })
            })
            .collect();
        log::debug!("rebuilt staff measure index: {} measures", self.index.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Duration, TimeSignature, Tone};

    fn measure(notes: usize) -> Measure {
        let mut measure = Measure::new(TimeSignature::default());
        for _ in 0..notes {
            measure
                .append(Note::new(Duration::QUARTER, vec![Tone::new(0, 0, 4)]), 0)
                .unwrap();
        }
        measure
    }

    fn staff() -> Staff {
        Staff::new(Clef::Treble, Instrument::new("Piano"))
    }

    #[test]
    fn test_index_expands_repeats() {
        let mut staff = staff();
        staff.append_measure(measure(4));
        staff
            .append_repeat(MeasureRepeat::new(vec![measure(1), measure(2)], 3).unwrap())
            .unwrap();

        assert_eq!(staff.measure_count(), 7);
        assert_eq!(staff.location(0).unwrap(), MeasureLocation { holder: 0, repeat: None });
        assert_eq!(staff.location(4).unwrap(), MeasureLocation { holder: 1, repeat: Some(3) });

        let fourth = staff.measure(4).unwrap();
        assert!(fourth.is_repeated());
        assert_eq!(fourth.measure().note_count(0).unwrap(), 2);
        assert!(!staff.measure(2).unwrap().is_repeated());
    }

    #[test]
    fn test_append_seeds_clef() {
        let mut staff = staff();
        staff.append_measure(measure(2));
        assert_eq!(staff.measure(0).unwrap().measure().original_clef(), Some(Clef::Treble));

        staff.measure_mut(0).unwrap().change_clef(Clef::Bass, 1, 0).unwrap();
        staff.append_measure(measure(2));
        assert_eq!(staff.measure(1).unwrap().measure().clef(0, 0), Ok(Clef::Bass));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut staff = staff();
        staff.append_measure(measure(1));
        staff
            .append_repeat(MeasureRepeat::new(vec![measure(2)], 2).unwrap())
            .unwrap();

        staff.insert_measure(measure(3), 0).unwrap();
        assert_eq!(staff.measure_count(), 4);
        assert_eq!(staff.note(2, 0, 0).map(|_| ()), Ok(()));

        // in front of the repeat, not inside it
        staff.insert_measure(measure(4), 2).unwrap();
        assert_eq!(staff.measure_count(), 5);
        assert_eq!(staff.holders().len(), 4);
        assert_eq!(
            staff.insert_measure(measure(1), 4),
            Err(NotationError::RepeatedMeasureCannotBeModified)
        );

        staff.remove_measure(0).unwrap();
        assert_eq!(staff.measure_count(), 4);
        assert_eq!(staff.remove_measure(3), Err(NotationError::RepeatedMeasureCannotBeModified));
    }

    #[test]
    fn test_repeat_measures() {
        let mut staff = staff();
        for notes in 1..=4 {
            staff.append_measure(measure(notes));
        }
        staff.repeat_measures(1..3, 2).unwrap();
        assert_eq!(staff.holders().len(), 3);
        assert_eq!(staff.measure_count(), 6);
        assert_eq!(staff.measure(3).unwrap().measure().note_count(0).unwrap(), 2);
        assert_eq!(staff.measure(5).unwrap().measure().note_count(0).unwrap(), 4);

        assert_eq!(
            staff.repeat_measures(2..4, 2),
            Err(NotationError::RepeatedMeasureCannotBeModified)
        );
        assert!(staff.repeat_measures(5..5, 2).is_err());
    }

    #[test]
    fn test_change_clef_carries_forward() {
        let mut staff = staff();
        for _ in 0..3 {
            staff.append_measure(measure(2));
        }
        staff.measure_mut(2).unwrap().change_clef(Clef::Alto, 1, 0).unwrap();

        staff.change_clef(Clef::Bass, 1, 0, 0).unwrap();
        assert_eq!(staff.measure(0).unwrap().measure().clef(0, 0), Ok(Clef::Treble));
        assert_eq!(staff.measure(0).unwrap().measure().clef(1, 0), Ok(Clef::Bass));
        assert_eq!(staff.measure(1).unwrap().measure().clef(0, 0), Ok(Clef::Bass));
        // measure 2 has its own change, so carrying stops there
        assert_eq!(staff.measure(2).unwrap().measure().clef(0, 0), Ok(Clef::Treble));
    }

    #[test]
    fn test_tie_within_measure_delegates() {
        let mut staff = staff();
        staff.append_measure(measure(3));
        staff.start_tie_from_note(0, 0, 0).unwrap();
        assert_eq!(staff.note(0, 0, 0).unwrap().tie, Some(Tie::Begin));
        assert_eq!(staff.note(1, 0, 0).unwrap().tie, Some(Tie::End));
    }
}
