//! Single notes and rests

use serde::{Deserialize, Serialize};

use super::duration::Duration;
use super::pitch::Tone;

/// Tie marker on a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tie {
    /// Tied to the following note
    Begin,
    /// Tied from the preceding note
    End,
    /// Tied on both sides
    BeginAndEnd,
}

impl Tie {
    pub fn has_begin(self) -> bool {
        matches!(self, Tie::Begin | Tie::BeginAndEnd)
    }

    pub fn has_end(self) -> bool {
        matches!(self, Tie::End | Tie::BeginAndEnd)
    }
}

/// Accent types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accent {
    Standard,
    Strong,
    Ghost,
}

/// Dynamic markings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dynamics {
    Ppp,
    Pp,
    P,
    Mp,
    Mf,
    F,
    Ff,
    Fff,
}

/// Articulation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Articulation {
    Tenuto,
    Marcato,
    Fermata,
    Legato,
}

/// A pitched note (one or more tones) or a rest (no tones)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub duration: Duration,

    /// Empty for rests
    tones: Vec<Tone>,

    pub tie: Option<Tie>,

    pub accent: Option<Accent>,

    #[serde(default)]
    pub is_staccato: bool,

    pub dynamics: Option<Dynamics>,

    pub articulation: Option<Articulation>,
}

impl Note {
    /// Create a pitched note. Passing no tones yields a rest.
    pub fn new(duration: Duration, tones: Vec<Tone>) -> Self {
        Self {
            duration,
            tones,
            tie: None,
            accent: None,
            is_staccato: false,
            dynamics: None,
            articulation: None,
        }
    }

    /// Create a rest
    pub fn rest(duration: Duration) -> Self {
        Self::new(duration, Vec::new())
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    pub fn is_rest(&self) -> bool {
        self.tones.is_empty()
    }

    /// Copy of this note with a different tie marker
    pub fn with_tie(&self, tie: Option<Tie>) -> Self {
        Self {
            tie,
            ..self.clone()
        }
    }
}
