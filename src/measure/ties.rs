//! Tie state machine
//!
//! Ties are stored per note as `begin`, `end` or `beginAndEnd`. Starting or
//! removing a tie on one note also updates its partner (the next note for the
//! begin side, the previous note for the end side) so ties always come in
//! matched pairs. When the partner would be outside the voice only the target
//! note changes; the staff resolves partners in neighbouring measures.

use super::Measure;
use crate::error::{NotationError, Result};
use crate::models::Tie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partner {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartnerChange {
    AddBegin,
    AddEnd,
    RemoveBegin,
    RemoveEnd,
}

impl PartnerChange {
    fn apply(self, tie: Option<Tie>) -> Result<Option<Tie>> {
        match (self, tie) {
            (PartnerChange::AddEnd, None) => Ok(Some(Tie::End)),
            (PartnerChange::AddEnd, Some(Tie::Begin)) => Ok(Some(Tie::BeginAndEnd)),
            (PartnerChange::AddBegin, None) => Ok(Some(Tie::Begin)),
            (PartnerChange::AddBegin, Some(Tie::End)) => Ok(Some(Tie::BeginAndEnd)),
            (PartnerChange::AddBegin | PartnerChange::AddEnd, _) => Err(NotationError::InvalidTieState),
            (PartnerChange::RemoveEnd, Some(Tie::End)) => Ok(None),
            (PartnerChange::RemoveEnd, Some(Tie::BeginAndEnd)) => Ok(Some(Tie::Begin)),
            (PartnerChange::RemoveBegin, Some(Tie::Begin)) => Ok(None),
            (PartnerChange::RemoveBegin, Some(Tie::BeginAndEnd)) => Ok(Some(Tie::End)),
            // Nothing to remove on this side
            (PartnerChange::RemoveBegin | PartnerChange::RemoveEnd, other) => Ok(other),
        }
    }
}

/// New state for the target, plus which partner changes and how
fn transition(requested: Option<Tie>, current: Option<Tie>) -> Result<(Option<Tie>, Partner, PartnerChange)> {
    use PartnerChange::*;
    match (requested, current) {
        (Some(Tie::Begin), None) => Ok((Some(Tie::Begin), Partner::Next, AddEnd)),
        (Some(Tie::Begin), Some(Tie::End)) => Ok((Some(Tie::BeginAndEnd), Partner::Next, AddEnd)),
        (Some(Tie::End), None) => Ok((Some(Tie::End), Partner::Previous, AddBegin)),
        (Some(Tie::End), Some(Tie::Begin)) => Ok((Some(Tie::BeginAndEnd), Partner::Previous, AddBegin)),
        (None, Some(Tie::Begin)) => Ok((None, Partner::Next, RemoveEnd)),
        (None, Some(Tie::End)) => Ok((None, Partner::Previous, RemoveBegin)),
        // Removing from a doubly tied note undoes the begin side
        (None, Some(Tie::BeginAndEnd)) => Ok((Some(Tie::End), Partner::Next, RemoveEnd)),
        _ => Err(NotationError::InvalidTieState),
    }
}

impl Measure {
    /// Tie the note at `flat` to the next note
    pub fn start_tie(&mut self, flat: usize, voice: usize) -> Result<()> {
        self.modify_tie(flat, Some(Tie::Begin), voice)
    }

    /// Remove the tie starting (or, failing that, ending) at `flat`
    pub fn remove_tie(&mut self, flat: usize, voice: usize) -> Result<()> {
        self.modify_tie(flat, None, voice)
    }

    pub(crate) fn modify_tie(&mut self, flat: usize, requested: Option<Tie>, voice: usize) -> Result<()> {
        let current = self.note(flat, voice)?.tie;
        if requested == Some(Tie::BeginAndEnd) {
            return Err(NotationError::InvalidTieState);
        }
        if requested == current {
            return Ok(());
        }

        let (target_state, partner, change) = transition(requested, current)?;
        let note_count = self.note_count(voice)?;
        let partner_index = match partner {
            Partner::Next => Some(flat + 1).filter(|&next| next < note_count),
            Partner::Previous => flat.checked_sub(1),
        };
        let partner_update = match partner_index {
            Some(index) => Some((index, change.apply(self.note(index, voice)?.tie)?)),
            None => None,
        };

        self.write_tie(flat, target_state, voice)?;
        if let Some((index, state)) = partner_update {
            self.write_tie(index, state, voice)?;
        }
        log::debug!(
            "tie at note {} (voice {}): {:?} -> {:?}",
            flat,
            voice,
            current,
            target_state
        );
        Ok(())
    }

    /// Drop the end side of a tie without touching the previous note
    pub(crate) fn remove_tie_end(&mut self, flat: usize, voice: usize) -> Result<()> {
        let state = PartnerChange::RemoveEnd.apply(self.note(flat, voice)?.tie)?;
        self.write_tie(flat, state, voice)
    }

    /// Drop the begin side of a tie without touching the next note
    pub(crate) fn remove_tie_begin(&mut self, flat: usize, voice: usize) -> Result<()> {
        let state = PartnerChange::RemoveBegin.apply(self.note(flat, voice)?.tie)?;
        self.write_tie(flat, state, voice)
    }

    fn write_tie(&mut self, flat: usize, tie: Option<Tie>, voice: usize) -> Result<()> {
        let (location, _) = self.resolve(flat, voice)?;
        self.voices[voice][location.collection].set_tie(location.sub_index(), tie)
    }
}
