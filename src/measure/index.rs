//! Flat note index for a voice
//!
//! Maps every individual note position in a voice (counting each note inside a
//! tuplet separately) to the collection that owns it and the note's sub-index
//! within that collection. The index is a pure projection of the voice and is
//! rebuilt from scratch whenever the voice changes; it is never patched.

use crate::models::NoteCollection;

/// Where a flat note position lives inside a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteLocation {
    /// Index of the owning collection in the voice
    pub collection: usize,
    /// Sub-index inside a tuplet; `None` for a plain note
    pub sub: Option<usize>,
}

impl NoteLocation {
    /// Sub-index to pass to the owning collection
    pub fn sub_index(&self) -> usize {
        self.sub.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceIndex {
    locations: Vec<NoteLocation>,
    /// First flat index of each collection
    starts: Vec<usize>,
}

impl VoiceIndex {
    pub fn build(voice: &[NoteCollection]) -> Self {
        let mut locations = Vec::new();
        let mut starts = Vec::with_capacity(voice.len());
        for (collection, item) in voice.iter().enumerate() {
            starts.push(locations.len());
            match item {
                NoteCollection::Note(_) => locations.push(NoteLocation {
                    collection,
                    sub: None,
                }),
                NoteCollection::Tuplet(tuplet) => {
                    locations.extend((0..tuplet.note_count()).map(|sub| NoteLocation {
                        collection,
                        sub: Some(sub),
                    }))
                }
            }
        }
        Self { locations, starts }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn location(&self, flat: usize) -> Option<NoteLocation> {
        self.locations.get(flat).copied()
    }

    /// Inverse of [`VoiceIndex::location`]
    pub fn flat_index(&self, location: NoteLocation) -> Option<usize> {
        let flat = self.starts.get(location.collection)? + location.sub_index();
        (self.location(flat)? == location).then_some(flat)
    }

    pub fn start_of(&self, collection: usize) -> Option<usize> {
        self.starts.get(collection).copied()
    }

    /// True when `flat` sits between two collections (or at either end)
    pub fn is_boundary(&self, flat: usize) -> bool {
        if flat == self.len() {
            return true;
        }
        matches!(self.location(flat), Some(NoteLocation { sub: None | Some(0), .. }))
    }

    /// Collection index a boundary position refers to (`voice.len()` at the end)
    pub fn collection_at_boundary(&self, flat: usize) -> usize {
        self.location(flat)
            .map(|location| location.collection)
            .unwrap_or(self.starts.len())
    }
}
