//! Force and moment time series of a case.

use crate::case::CaseFile;
use crate::config::AnalysisConfig;
use crate::filter::{Kernel, check_window, smooth, trim_edges};
use crate::reader::{RowDiagnostic, Table, read_table};
use crate::stage::{Processing, Stage};
use crate::stats::Statistics;
use crate::window::{CycleWindow, select, time_range_mask};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Columns per row: time followed by three types of three components.
pub const FORCE_COLUMNS: usize = 10;

const FORCE_FILE: &str = "force.dat";
const MOMENT_FILE: &str = "moment.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Forces,
    Moments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceType {
    #[default]
    Total,
    Pressure,
    Viscous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    #[default]
    X,
    Y,
    Z,
}

impl ForceType {
    pub const ALL: [ForceType; 3] = [ForceType::Total, ForceType::Pressure, ForceType::Viscous];

    fn index(self) -> usize {
        self as usize
    }
}

impl Component {
    pub const ALL: [Component; 3] = [Component::X, Component::Y, Component::Z];

    fn index(self) -> usize {
        self as usize
    }
}

/// Position of a series in a force/moment file row.
fn column(force_type: ForceType, component: Component) -> usize {
    1 + 3 * force_type.index() + component.index()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub fn get(&self, component: Component) -> &T {
        match component {
            Component::X => &self.x,
            Component::Y => &self.y,
            Component::Z => &self.z,
        }
    }
}

/// One value per force type and component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ForceGrid<T> {
    pub total: Vector3<T>,
    pub pressure: Vector3<T>,
    pub viscous: Vector3<T>,
}

impl<T> ForceGrid<T> {
    pub fn get(&self, force_type: ForceType, component: Component) -> &T {
        let vec3 = match force_type {
            ForceType::Total => &self.total,
            ForceType::Pressure => &self.pressure,
            ForceType::Viscous => &self.viscous,
        };
        vec3.get(component)
    }

    pub fn try_from_fn<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(ForceType, Component) -> Result<T>,
    {
        let mut vec3 = |force_type: ForceType| -> Result<Vector3<T>> {
            Ok(Vector3 {
                x: f(force_type, Component::X)?,
                y: f(force_type, Component::Y)?,
                z: f(force_type, Component::Z)?,
            })
        };
        Ok(Self {
            total: vec3(ForceType::Total)?,
            pressure: vec3(ForceType::Pressure)?,
            viscous: vec3(ForceType::Viscous)?,
        })
    }

    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(ForceType, Component) -> T,
    {
        let mut vec3 = |force_type: ForceType| Vector3 {
            x: f(force_type, Component::X),
            y: f(force_type, Component::Y),
            z: f(force_type, Component::Z),
        };
        Self {
            total: vec3(ForceType::Total),
            pressure: vec3(ForceType::Pressure),
            viscous: vec3(ForceType::Viscous),
        }
    }
}

/// Time axis and the nine series of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSeries {
    pub time: Vec<f64>,
    #[serde(flatten)]
    pub values: ForceGrid<Vec<f64>>,
}

impl GroupSeries {
    fn from_table(table: &Table) -> Self {
        Self {
            time: table.column(0),
            values: ForceGrid::from_fn(|force_type, component| {
                table.column(column(force_type, component))
            }),
        }
    }

    pub fn get(&self, force_type: ForceType, component: Component) -> &[f64] {
        self.values.get(force_type, component)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Statistics of every series over the samples selected by `mask`.
    fn statistics(&self, mask: Option<&[bool]>) -> ForceGrid<Statistics> {
        ForceGrid::from_fn(|force_type, component| {
            let vals = self.get(force_type, component);
            match mask {
                Some(mask) => Statistics::of(&select(vals, mask)),
                None => Statistics::of(vals),
            }
        })
    }

    /// Smooth the part of every series inside `cycle_window`.
    fn smoothed(&self, cycle_window: &CycleWindow, kernel: Kernel, window: usize) -> Result<Self> {
        let mask = cycle_window.mask(&self.time);
        let values = ForceGrid::try_from_fn(|force_type, component| {
            let vals = select(self.get(force_type, component), &mask);
            smooth(&vals, window, kernel)
                .with_context(|| format!("failed to filter {force_type:?} {component:?}"))
        })?;
        let time = trim_edges(&select(&self.time, &mask), window);
        Ok(Self { time, values })
    }
}

/// Forces and moments of one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceRecord {
    pub forces: GroupSeries,
    pub moments: GroupSeries,
}

impl ForceRecord {
    pub fn group(&self, group: Group) -> &GroupSeries {
        match group {
            Group::Forces => &self.forces,
            Group::Moments => &self.moments,
        }
    }
}

/// Statistics of every force and moment series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceStatistics {
    pub forces: ForceGrid<Statistics>,
    pub moments: ForceGrid<Statistics>,
}

impl ForceStatistics {
    pub fn group(&self, group: Group) -> &ForceGrid<Statistics> {
        match group {
            Group::Forces => &self.forces,
            Group::Moments => &self.moments,
        }
    }
}

/// Force and moment series of a case, with their derived statistics.
#[derive(Debug)]
pub struct ForceSeries {
    specific_case: String,
    parent_case: String,
    cycle_window: CycleWindow,
    record: ForceRecord,
    diagnostics: Vec<RowDiagnostic>,
    processing: Processing<ForceRecord, ForceStatistics>,
}

impl ForceSeries {
    /// Read `force.dat` and `moment.dat` next to `input`.
    ///
    /// # Errors
    /// Returns an error if either file cannot be opened or read.
    pub fn open<P: AsRef<Path>>(input: P, cycle_window: CycleWindow) -> Result<Self> {
        let input = input.as_ref();
        let force_file = CaseFile::sibling(input, FORCE_FILE);
        let moment_file = CaseFile::sibling(input, MOMENT_FILE);

        let force_table = read_table(&force_file.path, FORCE_COLUMNS)
            .context("failed to read force file")?;
        let moment_table = read_table(&moment_file.path, FORCE_COLUMNS)
            .context("failed to read moment file")?;

        let record = ForceRecord {
            forces: GroupSeries::from_table(&force_table),
            moments: GroupSeries::from_table(&moment_table),
        };
        let diagnostics = force_table
            .diagnostics()
            .iter()
            .chain(moment_table.diagnostics())
            .cloned()
            .collect();

        Ok(Self {
            specific_case: force_file.specific_case,
            parent_case: force_file.parent_case,
            cycle_window,
            record,
            diagnostics,
            processing: Processing::new(),
        })
    }

    /// Read the case and run the processing steps enabled in `cfg`.
    ///
    /// # Errors
    /// Returns an error if the files cannot be read or a processing step fails.
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
                .context("failed to filter forces and moments")?;
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

    pub fn record(&self) -> &ForceRecord {
        &self.record
    }

    pub fn forces(&self) -> &GroupSeries {
        &self.record.forces
    }

    pub fn moments(&self) -> &GroupSeries {
        &self.record.moments
    }

    /// Rows dropped while reading both files.
    pub fn diagnostics(&self) -> &[RowDiagnostic] {
        &self.diagnostics
    }

    pub fn stage(&self) -> Stage {
        self.processing.stage()
    }

    /// Mean and standard deviation of the raw series inside the cycle window.
    ///
    /// Forces and moments are masked by their own time axes.
    pub fn average_std(&mut self) -> ForceStatistics {
        let stats = ForceStatistics {
            forces: self.raw_statistics(Group::Forces),
            moments: self.raw_statistics(Group::Moments),
        };
        *self.processing.set_raw_stats(stats)
    }

    fn raw_statistics(&self, group: Group) -> ForceGrid<Statistics> {
        let series = self.record.group(group);
        let mask = self.cycle_window.mask(&series.time);
        series.statistics(Some(&mask))
    }

    pub fn raw_stats(&self) -> Option<&ForceStatistics> {
        self.processing.raw_stats()
    }

    /// Smooth every series inside the cycle window.
    ///
    /// Nothing is stored unless every series was filtered.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidArgument`](crate::AnalysisError) if `window`
    /// is even or longer than the windowed series.
    pub fn filter(&mut self, kernel: Kernel, window: usize) -> Result<&ForceRecord> {
        check_window(window)?;

        let filtered = ForceRecord {
            forces: self
                .record
                .forces
                .smoothed(&self.cycle_window, kernel, window)
                .context("failed to filter forces")?,
            moments: self
                .record
                .moments
                .smoothed(&self.cycle_window, kernel, window)
                .context("failed to filter moments")?,
        };
        log::info!(
            "filtered {} with a {kernel} window of {window}: {} force and {} moment samples left",
            self.specific_case,
            filtered.forces.len(),
            filtered.moments.len()
        );

        Ok(self.processing.set_filtered(filtered))
    }

    pub fn filtered(&self) -> Option<&ForceRecord> {
        self.processing.filtered()
    }

    /// Mean and standard deviation of the filtered series, with no further masking.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Precondition`](crate::AnalysisError) if
    /// [`ForceSeries::filter`] has not been run.
    pub fn filtered_average_std(&mut self) -> Result<ForceStatistics> {
        let stats = self.processing.average_filtered(|record| ForceStatistics {
            forces: record.forces.statistics(None),
            moments: record.moments.statistics(None),
        })?;
        Ok(*stats)
    }

    pub fn filtered_stats(&self) -> Option<&ForceStatistics> {
        self.processing.filtered_stats()
    }

    /// Values of one raw series with `start <= time <= end`.
    pub fn by_time(
        &self,
        group: Group,
        start: f64,
        end: f64,
        force_type: ForceType,
        component: Component,
    ) -> Vec<f64> {
        let series = self.record.group(group);
        let mask = time_range_mask(&series.time, start, end);
        select(series.get(force_type, component), &mask)
    }

    /// First time of a group, or `None` if it has no samples.
    pub fn min_time(&self, group: Group) -> Option<f64> {
        let min_time = self.record.group(group).time.first().copied();
        if let Some(min_time) = min_time {
            log::info!("min time of {group:?} is {min_time}");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_table;

    fn table(rows: &[[f64; FORCE_COLUMNS]]) -> Table {
        let text: String = rows
            .iter()
            .map(|row| {
                let vals: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                format!(
                    "{} ({}) ({}) ({})\n",
                    vals[0],
                    vals[1..4].join(" "),
                    vals[4..7].join(" "),
                    vals[7..].join(" ")
                )
            })
            .collect();
        parse_table(text.as_bytes(), FORCE_COLUMNS, 0).unwrap()
    }

    #[test]
    fn columns_map_to_types_and_components() {
        let row = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let series = GroupSeries::from_table(&table(&[row]));
        assert_eq!(series.time, vec![0.5]);
        assert_eq!(series.get(ForceType::Total, Component::X), &[1.0]);
        assert_eq!(series.get(ForceType::Total, Component::Z), &[3.0]);
        assert_eq!(series.get(ForceType::Pressure, Component::Y), &[5.0]);
        assert_eq!(series.get(ForceType::Viscous, Component::X), &[7.0]);
        assert_eq!(series.get(ForceType::Viscous, Component::Z), &[9.0]);
    }

    #[test]
    fn masked_statistics_use_the_tail() {
        let rows: Vec<[f64; FORCE_COLUMNS]> = (0..=4)
            .map(|i| {
                let t = i as f64;
                let v = if i < 2 { 100.0 } else { t };
                [t, v, v, v, v, v, v, v, v, v]
            })
            .collect();
        let series = GroupSeries::from_table(&table(&rows));
        let mask = CycleWindow::new(1.0, 2.0).unwrap().mask(&series.time);
        let stats = series.statistics(Some(&mask));
        let total_x = stats.get(ForceType::Total, Component::X);
        assert_eq!(total_x.average, 3.0);
        assert!((total_x.std - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn smoothing_keeps_series_aligned() {
        let rows: Vec<[f64; FORCE_COLUMNS]> = (0..20)
            .map(|i| {
                let t = i as f64;
                [t, t, 2.0 * t, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            })
            .collect();
        let series = GroupSeries::from_table(&table(&rows));
        let smoothed = series
            .smoothed(&CycleWindow::full(), Kernel::Flat, 5)
            .unwrap();
        assert_eq!(smoothed.len(), 16);
        assert_eq!(smoothed.get(ForceType::Total, Component::X).len(), 16);
        assert_eq!(smoothed.time[0], 2.0);
        // A linear ramp is unchanged by a centered average.
        for (t, v) in smoothed.time.iter().zip(smoothed.get(ForceType::Total, Component::Y)) {
            assert!((2.0 * t - v).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_serializes_as_nested_names() {
        let grid = ForceGrid::from_fn(|force_type, component| {
            format!("{force_type:?}-{component:?}")
        });
        let value = serde_json::to_value(grid).unwrap();
        assert_eq!(value["pressure"]["y"], "Pressure-Y");
        assert_eq!(value["viscous"]["z"], "Viscous-Z");
    }
}
