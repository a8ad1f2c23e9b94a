//! Measures: parallel voices of notes and tuplets
//!
//! A measure owns one or more voices. Each voice is an ordered list of
//! [`NoteCollection`]s, and every position query goes through a per-voice
//! [`VoiceIndex`] that is rebuilt whenever that voice changes.
//!
//! Clef changes are keyed by flat note index and are not re-keyed when notes
//! are inserted or removed. Ties live on the notes and move with them.

pub mod clefs;
pub mod index;
pub mod ties;

use std::collections::BTreeMap;
use std::iter;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{NotationError, Result};
use crate::models::{Clef, Note, NoteCollection, TickFraction, Ticks, TimeSignature, Tuplet};

pub use index::{NoteLocation, VoiceIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MeasureRecord")]
pub struct Measure {
    time_signature: TimeSignature,

    /// Clef at flat index 0 when no explicit entry governs it
    original_clef: Option<Clef>,

    /// Most recently assigned clef, regardless of position
    last_clef: Option<Clef>,

    voices: Vec<Vec<NoteCollection>>,

    /// Clef takes effect from the key onward until superseded
    clefs: BTreeMap<usize, Clef>,

    /// Derived from `voices`; one entry per voice
    #[serde(skip)]
    index: Vec<VoiceIndex>,
}

/// Measure as read by serde, before the index is derived
#[derive(Deserialize)]
struct MeasureRecord {
    time_signature: TimeSignature,
    original_clef: Option<Clef>,
    last_clef: Option<Clef>,
    voices: Vec<Vec<NoteCollection>>,
    #[serde(default)]
    clefs: BTreeMap<usize, Clef>,
}

impl From<MeasureRecord> for Measure {
    fn from(record: MeasureRecord) -> Self {
        let mut measure = Measure {
            time_signature: record.time_signature,
            original_clef: record.original_clef,
            last_clef: record.last_clef,
            voices: record.voices,
            clefs: record.clefs,
            index: Vec::new(),
        };
        if measure.voices.is_empty() {
            measure.voices.push(Vec::new());
        }
        measure.rebuild_all();
        measure
    }
}

impl Measure {
    /// Empty measure with a single voice
    pub fn new(time_signature: TimeSignature) -> Self {
        Self::with_voices(time_signature, Vec::new())
    }

    /// Measure with the given voices (an empty list yields one empty voice)
    pub fn with_voices(time_signature: TimeSignature, voices: Vec<Vec<NoteCollection>>) -> Self {
        Measure::from(MeasureRecord {
            time_signature,
            original_clef: None,
            last_clef: None,
            voices,
            clefs: BTreeMap::new(),
        })
    }

    /// Set the clef in effect at the start of the measure
    pub fn with_clef(mut self, clef: Clef) -> Self {
        self.original_clef = Some(clef);
        self.last_clef = Some(clef);
        self
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn original_clef(&self) -> Option<Clef> {
        self.original_clef
    }

    pub fn last_clef(&self) -> Option<Clef> {
        self.last_clef
    }

    pub fn clefs(&self) -> &BTreeMap<usize, Clef> {
        &self.clefs
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Vec<NoteCollection>] {
        &self.voices
    }

    pub fn voice(&self, voice: usize) -> Result<&[NoteCollection]> {
        self.voices
            .get(voice)
            .map(Vec::as_slice)
            .ok_or_else(|| NotationError::out_of_range(voice, self.voices.len()))
    }

    pub fn voice_index(&self, voice: usize) -> Result<&VoiceIndex> {
        self.index
            .get(voice)
            .ok_or_else(|| NotationError::out_of_range(voice, self.voices.len()))
    }

    /// Individual notes in a voice, counting each tuplet member
    pub fn note_count(&self, voice: usize) -> Result<usize> {
        Ok(self.voice_index(voice)?.len())
    }

    pub fn note_counts(&self) -> Vec<usize> {
        self.index.iter().map(VoiceIndex::len).collect()
    }

    pub fn location(&self, flat: usize, voice: usize) -> Result<NoteLocation> {
        let index = self.voice_index(voice)?;
        index
            .location(flat)
            .ok_or_else(|| NotationError::out_of_range(flat, index.len()))
    }

    /// Flat index of a location (inverse of [`Measure::location`])
    pub fn flat_index(&self, location: NoteLocation, voice: usize) -> Result<usize> {
        let index = self.voice_index(voice)?;
        index
            .flat_index(location)
            .ok_or_else(|| NotationError::out_of_range(location.collection, self.voices[voice].len()))
    }

    /// Location and owning collection, checking they agree
    fn resolve(&self, flat: usize, voice: usize) -> Result<(NoteLocation, &NoteCollection)> {
        let location = self.location(flat, voice)?;
        let collection = self.voices[voice]
            .get(location.collection)
            .ok_or_else(|| NotationError::internal(format!("index points past voice {} end", voice)))?;
        match (collection, location.sub) {
            (NoteCollection::Note(_), None) | (NoteCollection::Tuplet(_), Some(_)) => Ok((location, collection)),
            _ => Err(NotationError::internal(format!(
                "index entry {} in voice {} does not match collection kind",
                flat, voice
            ))),
        }
    }

    pub fn note(&self, flat: usize, voice: usize) -> Result<&Note> {
        let (location, collection) = self.resolve(flat, voice)?;
        collection.note(location.sub_index())
    }

    /// Total ticks of a voice
    pub fn ticks(&self, voice: usize) -> Result<Ticks> {
        Ok(self.voice(voice)?.iter().map(NoteCollection::ticks).sum())
    }

    /// Ticks elapsed in `voice` before the note at `flat`
    ///
    /// Inside a tuplet this is an exact fraction; each voice is timed
    /// independently.
    pub fn cumulative_ticks(&self, flat: usize, voice: usize) -> Result<TickFraction> {
        let (location, collection) = self.resolve(flat, voice)?;
        let before: Ticks = self.voices[voice][..location.collection]
            .iter()
            .map(NoteCollection::ticks)
            .sum();
        Ok(TickFraction::from_integer(before) + collection.offset(location.sub_index())?)
    }

    // ------------------------------------------------------------------
    // Content editing
    // ------------------------------------------------------------------

    /// Append to a voice; `voice == voice_count()` opens a new voice
    pub fn append(&mut self, collection: impl Into<NoteCollection>, voice: usize) -> Result<()> {
        if voice > self.voices.len() {
            return Err(NotationError::out_of_range(voice, self.voices.len()));
        }
        if voice == self.voices.len() {
            self.voices.push(Vec::new());
            self.index.push(VoiceIndex::default());
        }
        self.voices[voice].push(collection.into());
        self.rebuild(voice);
        Ok(())
    }

    /// Insert before the note at `flat`, which must start a collection
    pub fn insert(&mut self, collection: impl Into<NoteCollection>, flat: usize, voice: usize) -> Result<()> {
        let index = self.voice_index(voice)?;
        if flat > index.len() {
            return Err(NotationError::out_of_range(flat, index.len()));
        }
        if !index.is_boundary(flat) {
            return Err(NotationError::IndexInsideTuplet(flat));
        }
        let position = index.collection_at_boundary(flat);
        self.voices[voice].insert(position, collection.into());
        self.rebuild(voice);
        Ok(())
    }

    /// Remove a plain note
    pub fn remove_note(&mut self, flat: usize, voice: usize) -> Result<()> {
        let (location, _) = self.resolve(flat, voice)?;
        if location.sub.is_some() {
            return Err(NotationError::IndexInsideTuplet(flat));
        }
        self.voices[voice].remove(location.collection);
        self.rebuild(voice);
        Ok(())
    }

    /// Remove every collection in `range`; tuplets must be covered entirely
    pub fn remove_notes(&mut self, range: Range<usize>, voice: usize) -> Result<()> {
        let collections = self.covered_collections(&range, voice)?;
        if collections.is_empty() {
            return Ok(());
        }
        self.voices[voice].drain(collections);
        self.rebuild(voice);
        Ok(())
    }

    /// Replace the note at `flat`; tuplet members keep the tuplet's rules
    pub fn replace_note(&mut self, flat: usize, note: Note, voice: usize) -> Result<()> {
        let (location, _) = self.resolve(flat, voice)?;
        match &mut self.voices[voice][location.collection] {
            NoteCollection::Note(existing) => *existing = note,
            NoteCollection::Tuplet(tuplet) => tuplet.replace_note(location.sub_index(), note)?,
        }
        Ok(())
    }

    /// Group the plain notes in `range` into a tuplet
    ///
    /// `in_space_of` defaults to the standard ratio for the note count.
    pub fn create_tuplet(&mut self, range: Range<usize>, in_space_of: Option<u8>, voice: usize) -> Result<()> {
        let index = self.voice_index(voice)?;
        if range.start >= range.end || range.end > index.len() {
            return Err(NotationError::out_of_range(range.end, index.len()));
        }
        let mut notes = Vec::with_capacity(range.len());
        for flat in range.clone() {
            let (location, collection) = self.resolve(flat, voice)?;
            match (location.sub, collection) {
                (None, NoteCollection::Note(note)) => notes.push(note.clone()),
                _ => return Err(NotationError::IndexInsideTuplet(flat)),
            }
        }
        let tuplet = match in_space_of {
            Some(space) => Tuplet::with_space(notes, space)?,
            None => Tuplet::new(notes)?,
        };

        let start = self.location(range.start, voice)?.collection;
        let end = start + range.len();
        self.voices[voice].splice(start..end, iter::once(NoteCollection::Tuplet(tuplet)));
        self.rebuild(voice);
        log::debug!("created tuplet over notes {:?} in voice {}", range, voice);
        Ok(())
    }

    /// Replace the tuplet containing `flat` with its items
    pub fn break_down_tuplet(&mut self, flat: usize, voice: usize) -> Result<()> {
        let (location, collection) = self.resolve(flat, voice)?;
        let NoteCollection::Tuplet(tuplet) = collection else {
            return Err(NotationError::NoTupletAtIndex(flat));
        };
        let items = tuplet.clone().into_items();
        self.voices[voice].splice(location.collection..=location.collection, items);
        self.rebuild(voice);
        Ok(())
    }

    /// Collection range exactly covered by a flat range
    fn covered_collections(&self, range: &Range<usize>, voice: usize) -> Result<Range<usize>> {
        let index = self.voice_index(voice)?;
        if range.start > range.end || range.end > index.len() {
            return Err(NotationError::out_of_range(range.end, index.len()));
        }
        if !index.is_boundary(range.start) || !index.is_boundary(range.end) {
            return Err(NotationError::TupletNotCompletelyCovered);
        }
        Ok(index.collection_at_boundary(range.start)..index.collection_at_boundary(range.end))
    }

    fn rebuild(&mut self, voice: usize) {
        self.index[voice] = VoiceIndex::build(&self.voices[voice]);
        log::debug!(
            "rebuilt note index for voice {}: {} notes",
            voice,
            self.index[voice].len()
        );
    }

    fn rebuild_all(&mut self) {
        self.index = self.voices.iter().map(|voice| VoiceIndex::build(voice)).collect();
    }
}
