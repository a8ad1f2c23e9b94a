//! Measure repeats
//!
//! A repeat stores its measures once and plays them `repeat_count` times in
//! total. The first pass is the stored measures themselves; later passes are
//! read-only views of them.

use serde::{Deserialize, Serialize};

use super::StaffMeasure;
use crate::error::{NotationError, Result};
use crate::measure::Measure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MeasureRepeatRecord")]
pub struct MeasureRepeat {
    repeat_count: usize,
    measures: Vec<Measure>,
}

#[derive(Deserialize)]
struct MeasureRepeatRecord {
    repeat_count: usize,
    measures: Vec<Measure>,
}

impl TryFrom<MeasureRepeatRecord> for MeasureRepeat {
    type Error = NotationError;

    fn try_from(record: MeasureRepeatRecord) -> Result<Self> {
        MeasureRepeat::new(record.measures, record.repeat_count)
    }
}

impl MeasureRepeat {
    pub fn new(measures: Vec<Measure>, repeat_count: usize) -> Result<Self> {
        if measures.is_empty() {
            return Err(NotationError::NoMeasuresToRepeat);
        }
        if repeat_count == 0 {
            return Err(NotationError::InvalidRepeatCount(repeat_count));
        }
        Ok(Self {
            repeat_count,
            measures,
        })
    }

    pub fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    /// Stored (first pass) measures
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Measures played, counting every pass
    pub fn measure_count(&self) -> usize {
        self.measures.len() * self.repeat_count
    }

    /// Measure at position `sub` of the expansion
    pub fn measure(&self, sub: usize) -> Result<StaffMeasure<'_>> {
        if sub >= self.measure_count() {
            return Err(NotationError::out_of_range(sub, self.measure_count()));
        }
        let measure = &self.measures[sub % self.measures.len()];
        if sub < self.measures.len() {
            Ok(StaffMeasure::Measure(measure))
        } else {
            Ok(StaffMeasure::Repeated(measure))
        }
    }

    pub fn measure_mut(&mut self, sub: usize) -> Result<&mut Measure> {
        if sub >= self.measure_count() {
            return Err(NotationError::out_of_range(sub, self.measure_count()));
        }
        self.measures
            .get_mut(sub)
            .ok_or(NotationError::RepeatedMeasureCannotBeModified)
    }

    /// Every played measure in order
    pub fn expand(&self) -> Vec<StaffMeasure<'_>> {
        (0..self.measure_count())
            .filter_map(|sub| self.measure(sub).ok())
            .collect()
    }

    /// Insert before stored measure `sub`
    pub(crate) fn insert_measure(&mut self, measure: Measure, sub: usize) -> Result<()> {
        if sub >= self.measures.len() {
            return Err(NotationError::RepeatedMeasureCannotBeModified);
        }
        self.measures.insert(sub, measure);
        Ok(())
    }

    /// Remove stored measure `sub`; the last one cannot be removed
    pub(crate) fn remove_measure(&mut self, sub: usize) -> Result<Measure> {
        if sub >= self.measures.len() {
            return Err(NotationError::RepeatedMeasureCannotBeModified);
        }
        if self.measures.len() == 1 {
            return Err(NotationError::NoMeasuresToRepeat);
        }
        Ok(self.measures.remove(sub))
    }
}
