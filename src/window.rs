use crate::error::AnalysisError;
use anyhow::{Result, bail};
use serde::Serialize;

/// Selects the trailing `cycles` out of `total_cycles` periodic cycles.
///
/// A sample is kept when `time >= last_time * (1 - cycles / total_cycles)`,
/// which discards the start-up transient before statistics are taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleWindow {
    cycles: f64,
    total_cycles: f64,
}

impl CycleWindow {
    /// # Errors
    /// Returns [`AnalysisError::InvalidArgument`] unless
    /// `0 <= cycles <= total_cycles`. Zero cycles keeps only the samples at
    /// the final time.
    pub fn new(cycles: f64, total_cycles: f64) -> Result<Self> {
        if !(total_cycles > 0.0) {
            bail!(AnalysisError::InvalidArgument(format!(
                "total cycles must be positive, but is {total_cycles}"
            )));
        }
        if !(cycles >= 0.0 && cycles <= total_cycles) {
            bail!(AnalysisError::InvalidArgument(format!(
                "cycles must be in the range [0, {total_cycles}], but is {cycles}"
            )));
        }
        Ok(Self {
            cycles,
            total_cycles,
        })
    }

    /// Window covering the whole series.
    pub fn full() -> Self {
        Self {
            cycles: 1.0,
            total_cycles: 1.0,
        }
    }

    pub fn cycles(&self) -> f64 {
        self.cycles
    }

    pub fn total_cycles(&self) -> f64 {
        self.total_cycles
    }

    /// Earliest time kept for a series ending at `last_time`.
    pub fn cutoff(&self, last_time: f64) -> f64 {
        last_time * ((self.total_cycles - self.cycles) / self.total_cycles)
    }

    pub fn mask(&self, time: &[f64]) -> Vec<bool> {
        let Some(&last_time) = time.last() else {
            return Vec::new();
        };
        let cutoff = self.cutoff(last_time);
        log::debug!("cycle window cutoff at time {cutoff}");
        time.iter().map(|&t| t >= cutoff).collect()
    }
}

/// Keep the values whose mask entry is set.
pub fn select(vals: &[f64], mask: &[bool]) -> Vec<f64> {
    vals.iter()
        .zip(mask)
        .filter(|&(_, &keep)| keep)
        .map(|(&val, _)| val)
        .collect()
}

/// Mask of samples with `start <= time <= end`.
pub fn time_range_mask(time: &[f64], start: f64, end: f64) -> Vec<bool> {
    time.iter().map(|&t| t >= start && t <= end).collect()
}
