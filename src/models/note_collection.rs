//! The unit stored in a voice: a single note or a tuplet

use serde::{Deserialize, Serialize};

use super::duration::{Duration, TickFraction, Ticks};
use super::note::{Note, Tie};
use super::tuplet::Tuplet;
use crate::error::{NotationError, Result};

/// Content of one voice slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteCollection {
    Note(Note),
    Tuplet(Tuplet),
}

impl NoteCollection {
    /// Individual notes covered by this collection
    pub fn note_count(&self) -> usize {
        match self {
            NoteCollection::Note(_) => 1,
            NoteCollection::Tuplet(tuplet) => tuplet.note_count(),
        }
    }

    /// Written duration of the note, or the base duration of the tuplet
    pub fn duration(&self) -> Duration {
        match self {
            NoteCollection::Note(note) => note.duration,
            NoteCollection::Tuplet(tuplet) => tuplet.base_duration(),
        }
    }

    /// Full tick span
    pub fn ticks(&self) -> Ticks {
        match self {
            NoteCollection::Note(note) => note.duration.ticks(),
            NoteCollection::Tuplet(tuplet) => tuplet.ticks(),
        }
    }

    pub fn note(&self, sub: usize) -> Result<&Note> {
        match self {
            NoteCollection::Note(note) if sub == 0 => Ok(note),
            NoteCollection::Note(_) => Err(NotationError::InvalidIndex(sub)),
            NoteCollection::Tuplet(tuplet) => tuplet.note(sub),
        }
    }

    pub fn tie(&self, sub: usize) -> Result<Option<Tie>> {
        Ok(self.note(sub)?.tie)
    }

    pub fn set_tie(&mut self, sub: usize, tie: Option<Tie>) -> Result<()> {
        match self {
            NoteCollection::Note(note) if sub == 0 => {
                note.tie = tie;
                Ok(())
            }
            NoteCollection::Note(_) => Err(NotationError::InvalidIndex(sub)),
            NoteCollection::Tuplet(tuplet) => tuplet.set_tie(sub, tie),
        }
    }

    /// Played offset of the `sub`-th note from the start of this collection
    pub fn offset(&self, sub: usize) -> Result<TickFraction> {
        match self {
            NoteCollection::Note(_) if sub == 0 => Ok(TickFraction::from_integer(0)),
            NoteCollection::Note(_) => Err(NotationError::InvalidIndex(sub)),
            NoteCollection::Tuplet(tuplet) => tuplet.offset(sub),
        }
    }

    pub fn is_tuplet(&self) -> bool {
        matches!(self, NoteCollection::Tuplet(_))
    }
}

impl From<Note> for NoteCollection {
    fn from(note: Note) -> Self {
        NoteCollection::Note(note)
    }
}

impl From<Tuplet> for NoteCollection {
    fn from(tuplet: Tuplet) -> Self {
        NoteCollection::Tuplet(tuplet)
    }
}
