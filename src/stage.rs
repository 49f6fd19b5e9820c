use crate::error::AnalysisError;
use anyhow::{Result, bail};
use serde::Serialize;

/// How far a loaded series has been processed.
///
/// `Loaded -> [AveragedRaw] -> [Filtered -> AveragedFiltered]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Loaded,
    AveragedRaw,
    Filtered,
    AveragedFiltered,
}

/// Derived state of a series: raw statistics, filtered record, filtered statistics.
///
/// `R` is the record type and `S` the statistics type. Filtered statistics
/// live next to the record they were computed from, so they cannot exist
/// without it.
#[derive(Debug, Clone)]
pub(crate) struct Processing<R, S> {
    raw_stats: Option<S>,
    filtered: Option<(R, Option<S>)>,
}

impl<R, S> Processing<R, S> {
    pub fn new() -> Self {
        Self {
            raw_stats: None,
            filtered: None,
        }
    }

    pub fn stage(&self) -> Stage {
        match (&self.filtered, &self.raw_stats) {
            (Some((_, Some(_))), _) => Stage::AveragedFiltered,
            (Some((_, None)), _) => Stage::Filtered,
            (None, Some(_)) => Stage::AveragedRaw,
            (None, None) => Stage::Loaded,
        }
    }

    pub fn raw_stats(&self) -> Option<&S> {
        self.raw_stats.as_ref()
    }

    pub fn set_raw_stats(&mut self, stats: S) -> &S {
        self.raw_stats.insert(stats)
    }

    pub fn filtered(&self) -> Option<&R> {
        self.filtered.as_ref().map(|(record, _)| record)
    }

    /// Store a new filtered record, dropping statistics of any previous one.
    pub fn set_filtered(&mut self, record: R) -> &R {
        let (record, _) = self.filtered.insert((record, None));
        record
    }

    pub fn filtered_stats(&self) -> Option<&S> {
        self.filtered.as_ref().and_then(|(_, stats)| stats.as_ref())
    }

    /// Compute and store statistics of the filtered record.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Precondition`] if nothing has been filtered yet.
    pub fn average_filtered<F>(&mut self, compute: F) -> Result<&S>
    where
        F: FnOnce(&R) -> S,
    {
        match &mut self.filtered {
            Some((record, stats)) => Ok(&*stats.insert(compute(record))),
            None => bail!(AnalysisError::Precondition(
                "the series must be filtered before computing filtered statistics".to_string()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_stage_order() {
        let mut proc: Processing<Vec<f64>, f64> = Processing::new();
        assert_eq!(proc.stage(), Stage::Loaded);

        proc.set_raw_stats(1.0);
        assert_eq!(proc.stage(), Stage::AveragedRaw);

        proc.set_filtered(vec![1.0, 2.0]);
        assert_eq!(proc.stage(), Stage::Filtered);

        let avg = proc
            .average_filtered(|rec| rec.iter().sum::<f64>() / rec.len() as f64)
            .unwrap();
        assert_eq!(*avg, 1.5);
        assert_eq!(proc.stage(), Stage::AveragedFiltered);
        assert_eq!(proc.raw_stats(), Some(&1.0));
    }

    #[test]
    fn filtered_stats_need_filtering() {
        let mut proc: Processing<Vec<f64>, f64> = Processing::new();
        let err = proc.average_filtered(|_| 0.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::Precondition(_))
        ));
        assert_eq!(proc.stage(), Stage::Loaded);
    }

    #[test]
    fn refiltering_drops_stale_stats() {
        let mut proc: Processing<Vec<f64>, f64> = Processing::new();
        proc.set_filtered(vec![1.0]);
        proc.average_filtered(|_| 1.0).unwrap();
        proc.set_filtered(vec![2.0]);
        assert_eq!(proc.stage(), Stage::Filtered);
        assert!(proc.filtered_stats().is_none());
    }
}
