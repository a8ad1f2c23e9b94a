//! Tuplets: fixed-size groups of equal notes played in the space of another count
//!
//! A tuplet of `count` notes of `base_duration` occupies
//! `in_space_of * ticks(base_duration)` ticks. Each note's effective length is
//! that span divided by `count`, kept as an exact fraction so that summing the
//! notes of a tuplet gives back the span with no rounding drift.
//!
//! # Nesting
//!
//! Items may themselves be tuplets. A nested tuplet takes up
//! `ticks(nested) / ticks(base_duration)` slots of its parent and the slot
//! total must equal `count`. Offsets inside a nested tuplet are computed in the
//! nested tuplet's own scale and then compressed by the parent's ratio
//! `in_space_of / count`.

use serde::{Deserialize, Serialize};

use super::duration::{Duration, TickFraction, Ticks};
use super::note::{Note, Tie};
use super::note_collection::NoteCollection;
use crate::error::{NotationError, Result};

pub const MIN_TUPLET_COUNT: usize = 2;
pub const MAX_TUPLET_COUNT: usize = 7;

/// Default space for a tuplet of `count` notes: 2:3, 3:2, 4:3, 5:4, 6:4, 7:4
pub fn standard_space(count: usize) -> Option<u8> {
    match count {
        2 => Some(3),
        3 => Some(2),
        4 => Some(3),
        5..=7 => Some(4),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TupletRecord")]
pub struct Tuplet {
    /// Ratio numerator: slots played in the space of `in_space_of`
    count: u8,
    in_space_of: u8,
    /// Written duration of each slot
    base_duration: Duration,
    items: Vec<NoteCollection>,
}

/// Unvalidated tuplet as read by serde
#[derive(Deserialize)]
struct TupletRecord {
    count: u8,
    in_space_of: u8,
    base_duration: Duration,
    items: Vec<NoteCollection>,
}

impl TryFrom<TupletRecord> for Tuplet {
    type Error = NotationError;

    fn try_from(record: TupletRecord) -> Result<Self> {
        Tuplet::nested(
            record.count,
            record.in_space_of,
            record.base_duration,
            record.items,
        )
    }
}

impl Tuplet {
    /// Group 2-7 equal notes using the standard ratio for their count
    pub fn new(notes: Vec<Note>) -> Result<Self> {
        let count = notes.len();
        let in_space_of = standard_space(count).ok_or(NotationError::InvalidGroupingSize(count))?;
        Self::with_space(notes, in_space_of)
    }

    /// Group 2-7 equal notes in the space of `in_space_of` of the same duration
    pub fn with_space(notes: Vec<Note>, in_space_of: u8) -> Result<Self> {
        let count = notes.len();
        if !(MIN_TUPLET_COUNT..=MAX_TUPLET_COUNT).contains(&count) {
            return Err(NotationError::InvalidGroupingSize(count));
        }
        let base_duration = notes[0].duration;
        Self::nested(
            count as u8,
            in_space_of,
            base_duration,
            notes.into_iter().map(NoteCollection::Note).collect(),
        )
    }

    /// General constructor; items may include tuplets
    pub fn nested(
        count: u8,
        in_space_of: u8,
        base_duration: Duration,
        items: Vec<NoteCollection>,
    ) -> Result<Self> {
        let tuplet = Self {
            count,
            in_space_of,
            base_duration,
            items,
        };
        tuplet.validate()?;
        Ok(tuplet)
    }

    fn validate(&self) -> Result<()> {
        let count = self.count as usize;
        if !(MIN_TUPLET_COUNT..=MAX_TUPLET_COUNT).contains(&count) {
            return Err(NotationError::InvalidGroupingSize(count));
        }
        if self.in_space_of == 0 || self.in_space_of == self.count {
            return Err(NotationError::InvalidTupletRatio {
                count,
                in_space_of: self.in_space_of as usize,
            });
        }
        if self
            .items
            .iter()
            .any(|item| matches!(item, NoteCollection::Note(note) if note.is_rest()))
        {
            return Err(NotationError::RestsNotAllowed);
        }

        let base_ticks = self.base_duration.ticks();
        let mut slots = 0usize;
        for item in &self.items {
            match item {
                NoteCollection::Note(note) => {
                    if note.duration != self.base_duration {
                        return Err(NotationError::DurationMismatch);
                    }
                    slots += 1;
                }
                NoteCollection::Tuplet(inner) => {
                    let span = inner.ticks();
                    if span % base_ticks != 0 {
                        return Err(NotationError::DurationMismatch);
                    }
                    slots += (span / base_ticks) as usize;
                }
            }
        }
        if slots != count {
            return Err(NotationError::InvalidGroupingSize(slots));
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn in_space_of(&self) -> usize {
        self.in_space_of as usize
    }

    pub fn base_duration(&self) -> Duration {
        self.base_duration
    }

    pub fn items(&self) -> &[NoteCollection] {
        &self.items
    }

    pub fn into_items(self) -> Vec<NoteCollection> {
        self.items
    }

    /// Number of individual notes, counting inside nested tuplets
    pub fn note_count(&self) -> usize {
        self.items.iter().map(NoteCollection::note_count).sum()
    }

    /// Total span of the tuplet
    pub fn ticks(&self) -> Ticks {
        self.base_duration.ticks() * self.in_space_of as Ticks
    }

    /// Factor that turns written ticks into played ticks
    fn scale(&self) -> TickFraction {
        TickFraction::new(self.in_space_of as Ticks, self.count as Ticks)
    }

    /// Item holding the `sub`-th note, and the note's index inside that item
    fn locate(&self, sub: usize) -> Option<(usize, usize)> {
        let mut remaining = sub;
        for (item_index, item) in self.items.iter().enumerate() {
            let notes = item.note_count();
            if remaining < notes {
                return Some((item_index, remaining));
            }
            remaining -= notes;
        }
        None
    }

    pub fn note(&self, sub: usize) -> Result<&Note> {
        let (item_index, inner) = self.locate(sub).ok_or(NotationError::InvalidIndex(sub))?;
        match &self.items[item_index] {
            NoteCollection::Note(note) => Ok(note),
            NoteCollection::Tuplet(tuplet) => tuplet.note(inner),
        }
    }

    /// All notes in order, flattening nested tuplets
    pub fn notes(&self) -> Vec<&Note> {
        let mut notes = Vec::with_capacity(self.note_count());
        for item in &self.items {
            match item {
                NoteCollection::Note(note) => notes.push(note),
                NoteCollection::Tuplet(tuplet) => notes.extend(tuplet.notes()),
            }
        }
        notes
    }

    /// Replace the `sub`-th note; duration must match and rests are refused
    pub fn replace_note(&mut self, sub: usize, note: Note) -> Result<()> {
        let (item_index, inner) = self.locate(sub).ok_or(NotationError::InvalidIndex(sub))?;
        let base_duration = self.base_duration;
        match &mut self.items[item_index] {
            NoteCollection::Note(existing) => {
                if note.is_rest() || note.duration != base_duration {
                    return Err(NotationError::DurationMismatch);
                }
                *existing = note;
                Ok(())
            }
            NoteCollection::Tuplet(tuplet) => tuplet.replace_note(inner, note),
        }
    }

    pub fn set_tie(&mut self, sub: usize, tie: Option<Tie>) -> Result<()> {
        let note = self.note(sub)?.with_tie(tie);
        self.replace_note(sub, note)
    }

    /// Played offset of the `sub`-th note from the start of the tuplet
    pub fn offset(&self, sub: usize) -> Result<TickFraction> {
        let scale = self.scale();
        let mut offset = TickFraction::from_integer(0);
        let mut remaining = sub;
        for item in &self.items {
            let notes = item.note_count();
            if remaining < notes {
                let inner = match item {
                    NoteCollection::Note(_) => TickFraction::from_integer(0),
                    NoteCollection::Tuplet(tuplet) => tuplet.offset(remaining)?,
                };
                return Ok(offset + inner * scale);
            }
            offset += TickFraction::from_integer(item.ticks()) * scale;
            remaining -= notes;
        }
        Err(NotationError::InvalidIndex(sub))
    }

    /// Played length of the `sub`-th note
    pub fn note_ticks(&self, sub: usize) -> Result<TickFraction> {
        let (item_index, inner) = self.locate(sub).ok_or(NotationError::InvalidIndex(sub))?;
        let written = match &self.items[item_index] {
            NoteCollection::Note(note) => note.duration.exact_ticks(),
            NoteCollection::Tuplet(tuplet) => tuplet.note_ticks(inner)?,
        };
        Ok(written * self.scale())
    }
}
