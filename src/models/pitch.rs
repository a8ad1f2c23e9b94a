//! Boundary types: pitch, clef and instrument
//!
//! The engine never interprets these beyond equality and presence, so they are
//! kept deliberately small.

use serde::{Deserialize, Serialize};

/// A sounding pitch attached to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tone {
    /// Scale degree (0=C, 1=D, 2=E, 3=F, 4=G, 5=A, 6=B)
    pub step: u8,

    /// Accidental (-2=double flat, -1=flat, 0=natural, +1=sharp, +2=double sharp)
    pub alteration: i8,

    /// Octave number (4 = middle C octave)
    pub octave: i8,
}

impl Tone {
    pub const fn new(step: u8, alteration: i8, octave: i8) -> Self {
        Self {
            step,
            alteration,
            octave,
        }
    }
}

/// Clef types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clef {
    Treble,
    Bass,
    Alto,
    Tenor,
    Soprano,
    MezzoSoprano,
    Baritone,
    Percussion,
}

/// Instrument label carried by a staff
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
