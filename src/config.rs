use crate::filter::{Kernel, check_window};
use crate::window::CycleWindow;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Post-processing configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`AnalysisConfig::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Number of trailing cycles used for statistics.
    pub cycles: f64,
    /// Number of cycles simulated in total.
    pub total_cycles: f64,

    /// Compute statistics of the raw series on load.
    pub average: bool,

    /// Filter the series on load and compute filtered statistics.
    pub filter: bool,
    /// Smoothing kernel name, matched case-insensitively.
    /// See [`AnalysisConfig::kernel`].
    pub kernel: String,
    /// Smoothing window size (odd).
    pub window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cycles: 3.0,
            total_cycles: 3.0,
            average: true,
            filter: true,
            kernel: Kernel::Flat.to_string(),
            window: 11,
        }
    }
}

impl AnalysisConfig {
    /// Load an [`AnalysisConfig`] from a TOML file.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml_str(&contents).with_context(|| format!("failed to load {file:?}"))
    }

    /// Parse and validate an [`AnalysisConfig`] from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Cycle window described by this configuration.
    pub fn cycle_window(&self) -> Result<CycleWindow> {
        CycleWindow::new(self.cycles, self.total_cycles)
    }

    /// Smoothing kernel named by this configuration.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidArgument`](crate::AnalysisError) if the
    /// kernel name is unknown.
    pub fn kernel(&self) -> Result<Kernel> {
        Ok(self.kernel.parse()?)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.total_cycles, 0.0..).context("invalid total number of cycles")?;
        check_num(self.cycles, 0.0..=self.total_cycles).context("invalid number of cycles")?;
        self.cycle_window().context("invalid cycle window")?;

        self.kernel().context("invalid filter kernel")?;
        check_window(self.window).context("invalid filter window")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
