//! Clef assignment inside a measure
//!
//! A clef entry at flat index `k` governs every position from `k` until the
//! next entry. Positions before the first entry fall back to the original clef.

use super::Measure;
use crate::error::{NotationError, Result};
use crate::models::Clef;

impl Measure {
    /// Put `clef` into effect from `flat` onward
    pub fn change_clef(&mut self, clef: Clef, flat: usize, voice: usize) -> Result<()> {
        self.location(flat, voice)?;
        self.clefs.insert(flat, clef);
        self.last_clef = Some(clef);
        log::debug!("clef {:?} at note {} (voice {})", clef, flat, voice);
        Ok(())
    }

    /// Clef in effect at `flat`
    pub fn clef(&self, flat: usize, voice: usize) -> Result<Clef> {
        self.location(flat, voice)?;
        self.clefs
            .range(..=flat)
            .next_back()
            .map(|(_, clef)| *clef)
            .or(self.original_clef)
            .ok_or(NotationError::NoClefSpecified)
    }

    /// Set the starting clef when no explicit clef change exists yet
    ///
    /// Returns whether the measure was changed.
    pub fn change_first_clef_if_needed(&mut self, clef: Clef) -> bool {
        if !self.clefs.is_empty() {
            return false;
        }
        self.original_clef = Some(clef);
        self.last_clef = Some(clef);
        true
    }
}
