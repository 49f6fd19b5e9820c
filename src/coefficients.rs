//! Force coefficient time series of a case.

use crate::case::CaseFile;
use crate::config::AnalysisConfig;
use crate::filter::{Kernel, check_window, smooth, trim_edges};
use crate::reader::{RowDiagnostic, read_fixed_table};
use crate::stage::{Processing, Stage};
use crate::stats::Statistics;
use crate::window::{CycleWindow, select, time_range_mask};
use anyhow::{Context, Result, anyhow};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::{array, fmt, path::Path};

/// Columns per row: time followed by the twelve coefficients.
pub const COEFFICIENT_COLUMNS: usize = 13;
/// Lines of header written before the first data row.
pub const COEFFICIENT_HEADER_LINES: usize = 13;

const COEFFICIENT_FILE: &str = "coefficient.dat";

/// Coefficients in file column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coefficient {
    #[default]
    Cd,
    Cs,
    Cl,
    CmRoll,
    CmPitch,
    CmYaw,
    Cdf,
    Cdr,
    Csf,
    Csr,
    Clf,
    Clr,
}

impl Coefficient {
    pub const ALL: [Coefficient; 12] = [
        Coefficient::Cd,
        Coefficient::Cs,
        Coefficient::Cl,
        Coefficient::CmRoll,
        Coefficient::CmPitch,
        Coefficient::CmYaw,
        Coefficient::Cdf,
        Coefficient::Cdr,
        Coefficient::Csf,
        Coefficient::Csr,
        Coefficient::Clf,
        Coefficient::Clr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Coefficient::Cd => "Cd",
            Coefficient::Cs => "Cs",
            Coefficient::Cl => "Cl",
            Coefficient::CmRoll => "CmRoll",
            Coefficient::CmPitch => "CmPitch",
            Coefficient::CmYaw => "CmYaw",
            Coefficient::Cdf => "Cdf",
            Coefficient::Cdr => "Cdr",
            Coefficient::Csf => "Csf",
            Coefficient::Csr => "Csr",
            Coefficient::Clf => "Clf",
            Coefficient::Clr => "Clr",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per coefficient, serialized as a map keyed by coefficient name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet<T>([T; 12]);

impl<T> CoefficientSet<T> {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Coefficient) -> T,
    {
        Self(array::from_fn(|idx| f(Coefficient::ALL[idx])))
    }

    pub fn try_from_fn<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(Coefficient) -> Result<T>,
    {
        let vals: Vec<T> = Coefficient::ALL.into_iter().map(&mut f).collect::<Result<_>>()?;
        let vals: [T; 12] = vals
            .try_into()
            .map_err(|_| anyhow!("expected one value per coefficient"))?;
        Ok(Self(vals))
    }

    pub fn get(&self, coeff: Coefficient) -> &T {
        &self.0[coeff.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coefficient, &T)> {
        Coefficient::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T: Serialize> Serialize for CoefficientSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (coeff, val) in self.iter() {
            map.serialize_entry(coeff.name(), val)?;
        }
        map.end()
    }
}

/// Time axis and the twelve coefficient series of a case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRecord {
    pub time: Vec<f64>,
    #[serde(flatten)]
    pub values: CoefficientSet<Vec<f64>>,
}

impl CoefficientRecord {
    pub fn get(&self, coeff: Coefficient) -> &[f64] {
        self.values.get(coeff)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn statistics(&self, mask: Option<&[bool]>) -> CoefficientSet<Statistics> {
        CoefficientSet::from_fn(|coeff| {
            let vals = self.get(coeff);
            match mask {
                Some(mask) => Statistics::of(&select(vals, mask)),
                None => Statistics::of(vals),
            }
        })
    }
}

/// Force coefficient series of a case, with their derived statistics.
#[derive(Debug)]
pub struct CoefficientSeries {
    specific_case: String,
    parent_case: String,
    cycle_window: CycleWindow,
    record: CoefficientRecord,
    diagnostics: Vec<RowDiagnostic>,
    processing: Processing<CoefficientRecord, CoefficientSet<Statistics>>,
}

impl CoefficientSeries {
    /// Read `coefficient.dat` next to `input`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub fn open<P: AsRef<Path>>(input: P, cycle_window: CycleWindow) -> Result<Self> {
        let file = CaseFile::sibling(input, COEFFICIENT_FILE);
        let table = read_fixed_table(&file.path, COEFFICIENT_COLUMNS, COEFFICIENT_HEADER_LINES)
            .context("failed to read coefficient file")?;

        let record = CoefficientRecord {
            time: table.column(0),
            values: CoefficientSet::from_fn(|coeff| table.column(coeff.index() + 1)),
        };

        Ok(Self {
            specific_case: file.specific_case,
            parent_case: file.parent_case,
            cycle_window,
            record,
            diagnostics: table.diagnostics().to_vec(),
            processing: Processing::new(),
        })
    }

    /// Read the case and run the processing steps enabled in `cfg`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a processing step fails.
    pub fn load<P: AsRef<Path>>(input: P, cfg: &AnalysisConfig) -> Result<Self> {
        let cycle_window = cfg.cycle_window().context("invalid cycle window")?;
        let kernel = cfg.kernel().context("invalid filter kernel")?;
        let mut series = Self::open(input, cycle_window)?;

        if cfg.average {
            series.average_std();
        }
        if cfg.filter {
            series
                .filter(kernel, cfg.window)
                .context("failed to filter coefficients")?;
            series
                .filtered_average_std()
                .context("failed to compute filtered statistics")?;
        }

        Ok(series)
    }

    pub fn specific_case(&self) -> &str {
        &self.specific_case
    }

    pub fn parent_case(&self) -> &str {
        &self.parent_case
    }

    pub fn cycle_window(&self) -> &CycleWindow {
        &self.cycle_window
    }

    pub fn record(&self) -> &CoefficientRecord {
        &self.record
    }

    pub fn diagnostics(&self) -> &[RowDiagnostic] {
        &self.diagnostics
    }

    pub fn stage(&self) -> Stage {
        self.processing.stage()
    }

    /// Mean and standard deviation of every coefficient inside the cycle window.
    pub fn average_std(&mut self) -> CoefficientSet<Statistics> {
        let mask = self.cycle_window.mask(&self.record.time);
        let stats = self.record.statistics(Some(&mask));
        *self.processing.set_raw_stats(stats)
    }

    pub fn raw_stats(&self) -> Option<&CoefficientSet<Statistics>> {
        self.processing.raw_stats()
    }

    /// Smooth every coefficient inside the cycle window.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidArgument`](crate::AnalysisError) if `window`
    /// is even or longer than the windowed series; nothing is stored then.
    pub fn filter(&mut self, kernel: Kernel, window: usize) -> Result<&CoefficientRecord> {
        check_window(window)?;

        let mask = self.cycle_window.mask(&self.record.time);
        let values = CoefficientSet::try_from_fn(|coeff| {
            smooth(&select(self.record.get(coeff), &mask), window, kernel)
                .with_context(|| format!("failed to filter {coeff}"))
        })?;
        let time = trim_edges(&select(&self.record.time, &mask), window);
        log::info!(
            "filtered {} with a {kernel} window of {window}: {} coefficient samples left",
            self.specific_case,
            time.len()
        );

        Ok(self.processing.set_filtered(CoefficientRecord { time, values }))
    }

    pub fn filtered(&self) -> Option<&CoefficientRecord> {
        self.processing.filtered()
    }

    /// Mean and standard deviation of the filtered coefficients.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Precondition`](crate::AnalysisError) if
    /// [`CoefficientSeries::filter`] has not been run.
    pub fn filtered_average_std(&mut self) -> Result<CoefficientSet<Statistics>> {
        let stats = self
            .processing
            .average_filtered(|record| record.statistics(None))?;
        Ok(*stats)
    }

    pub fn filtered_stats(&self) -> Option<&CoefficientSet<Statistics>> {
        self.processing.filtered_stats()
    }

    /// Values of one raw coefficient with `start <= time <= end`.
    pub fn by_time(&self, start: f64, end: f64, coeff: Coefficient) -> Vec<f64> {
        let mask = time_range_mask(&self.record.time, start, end);
        select(self.record.get(coeff), &mask)
    }

    /// First time of the series, or `None` if it has no samples.
    pub fn min_time(&self) -> Option<f64> {
        let min_time = self.record.time.first().copied();
        if let Some(min_time) = min_time {
            log::info!("min time of coefficients is {min_time}");
        }
        min_time
    }

    /// Snapshot of the labels, stage and every statistic computed so far.
    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "specific_case": self.specific_case,
            "parent_case": self.parent_case,
            "cycle_window": self.cycle_window,
            "stage": self.stage(),
            "statistics": self.raw_stats(),
            "filtered_statistics": self.filtered_stats(),
        })
    }
}
