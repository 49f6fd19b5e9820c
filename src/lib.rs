//! Post-processing of force, moment and force coefficient time series
//! written by a CFD solver.
//!
//! A case is read into a [`ForceSeries`] or [`CoefficientSeries`], whose
//! statistics can then be taken over the trailing cycles of the run, either
//! on the raw series or after smoothing with a moving window.
//!
//! ```no_run
//! use foampost::{AnalysisConfig, ForceSeries, Group};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = AnalysisConfig::from_file("postprocess.toml")?;
//! let series = ForceSeries::load("sweep/aoa_05/mesh/postProcessing/forces/0/force.dat", &cfg)?;
//! println!("{}", series.report());
//! println!("{:?}", series.min_time(Group::Moments));
//! # Ok(())
//! # }
//! ```

pub mod case;
pub mod coefficients;
pub mod config;
pub mod error;
pub mod filter;
pub mod forces;
pub mod reader;
pub mod stage;
pub mod stats;
pub mod window;

pub use coefficients::{Coefficient, CoefficientRecord, CoefficientSeries, CoefficientSet};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use filter::{Kernel, smooth};
pub use forces::{
    Component, ForceGrid, ForceRecord, ForceSeries, ForceStatistics, ForceType, Group, GroupSeries,
};
pub use reader::{RowDiagnostic, RowIssue, Table};
pub use stage::Stage;
pub use stats::Statistics;
pub use window::CycleWindow;
