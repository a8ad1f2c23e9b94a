//! Time signature

use serde::{Deserialize, Serialize};

/// Time signature with tempo
///
/// `denominator` is meant to be a power of two; the duration validator
/// decides what to do with anything else. Tempo is carried but never used for
/// timing inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Number of beats per measure
    pub numerator: u32,
    /// Beat unit (2, 4, 8, 16, etc.)
    pub denominator: u32,
    /// Beats per minute
    pub tempo: u32,
}

impl TimeSignature {
    pub const fn new(numerator: u32, denominator: u32, tempo: u32) -> Self {
        Self {
            numerator,
            denominator,
            tempo,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4, 120)
    }
}
