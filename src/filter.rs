//! Moving-window smoothing of a single series.

use crate::error::AnalysisError;
use anyhow::{Result, bail};
use std::{f64::consts::PI, fmt, str::FromStr};

/// Shape of the smoothing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    /// Boxcar, i.e. a plain moving average.
    #[default]
    Flat,
    Hanning,
    Hamming,
    Bartlett,
    Blackman,
}

impl Kernel {
    /// Window weights, normalized to sum to one.
    pub fn weights(self, window: usize) -> Vec<f64> {
        if window == 1 {
            return vec![1.0];
        }
        let m = (window - 1) as f64;
        let raw: Vec<f64> = (0..window)
            .map(|n| {
                let n = n as f64;
                match self {
                    Kernel::Flat => 1.0,
                    Kernel::Hanning => 0.5 - 0.5 * (2.0 * PI * n / m).cos(),
                    Kernel::Hamming => 0.54 - 0.46 * (2.0 * PI * n / m).cos(),
                    Kernel::Bartlett => 1.0 - (2.0 * n / m - 1.0).abs(),
                    Kernel::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * n / m).cos() + 0.08 * (4.0 * PI * n / m).cos()
                    }
                }
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / sum).collect()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Flat => "flat",
            Kernel::Hanning => "hanning",
            Kernel::Hamming => "hamming",
            Kernel::Bartlett => "bartlett",
            Kernel::Blackman => "blackman",
        };
        f.write_str(name)
    }
}

impl FromStr for Kernel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Kernel::Flat),
            "hanning" => Ok(Kernel::Hanning),
            "hamming" => Ok(Kernel::Hamming),
            "bartlett" => Ok(Kernel::Bartlett),
            "blackman" => Ok(Kernel::Blackman),
            _ => Err(AnalysisError::InvalidArgument(format!(
                "unknown filter kernel {s:?}"
            ))),
        }
    }
}

/// Check that `window` is usable as a centered filter window.
pub fn check_window(window: usize) -> Result<()> {
    if window == 0 || window % 2 == 0 {
        bail!(AnalysisError::InvalidArgument(format!(
            "filter window must be an odd number >= 1, but is {window}"
        )));
    }
    Ok(())
}

/// Number of samples trimmed from each end by a window of this size.
pub fn half_width(window: usize) -> usize {
    (window - 1) / 2
}

/// Drop the samples a window of this size cannot cover, aligning `vals`
/// (typically the time axis) with the output of [`smooth`].
pub fn trim_edges(vals: &[f64], window: usize) -> Vec<f64> {
    let half = half_width(window);
    if vals.len() < 2 * half {
        return Vec::new();
    }
    vals[half..vals.len() - half].to_vec()
}

/// Smooth `vals` with a centered window.
///
/// Only fully covered positions are kept, so the result is `window - 1`
/// samples shorter than the input.
///
/// # Errors
/// Returns [`AnalysisError::InvalidArgument`] if `window` is even or longer
/// than the series.
pub fn smooth(vals: &[f64], window: usize, kernel: Kernel) -> Result<Vec<f64>> {
    check_window(window)?;
    let n_vals = vals.len();
    if window > 1 && window > n_vals {
        bail!(AnalysisError::InvalidArgument(format!(
            "filter window {window} is longer than the series ({n_vals} values)"
        )));
    }

    let weights = kernel.weights(window);
    let smoothed = vals
        .windows(window)
        .map(|seg| seg.iter().zip(&weights).map(|(v, w)| v * w).sum())
        .collect();
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn flat_is_moving_average() {
        let out = smooth(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, Kernel::Flat).unwrap();
        assert_close(&out, &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn output_is_window_minus_one_shorter() {
        let vals: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).sin()).collect();
        for window in [1, 3, 5, 11, 49] {
            for kernel in [Kernel::Flat, Kernel::Hanning, Kernel::Blackman] {
                let out = smooth(&vals, window, kernel).unwrap();
                assert_eq!(out.len(), vals.len() - (window - 1));
            }
        }
    }

    #[test]
    fn trimmed_time_lines_up_with_output() {
        let time = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let trimmed = trim_edges(&time, 5);
        assert_eq!(trimmed, vec![0.2, 0.3, 0.4]);
        assert_eq!(trimmed.len(), smooth(&time, 5, Kernel::Flat).unwrap().len());
    }

    #[test]
    fn window_of_one_is_identity() {
        let vals = [3.0, -1.0, 7.5];
        assert_close(&smooth(&vals, 1, Kernel::Hamming).unwrap(), &vals);
        assert!(smooth(&[], 1, Kernel::Flat).unwrap().is_empty());
    }

    #[test]
    fn even_window_is_rejected() {
        let err = smooth(&[1.0; 10], 4, Kernel::Flat).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn window_longer_than_series_is_rejected() {
        let err = smooth(&[1.0; 4], 5, Kernel::Flat).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn weights_are_normalized_and_symmetric() {
        for kernel in [
            Kernel::Flat,
            Kernel::Hanning,
            Kernel::Hamming,
            Kernel::Bartlett,
            Kernel::Blackman,
        ] {
            let weights = kernel.weights(7);
            assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            let reversed: Vec<f64> = weights.iter().rev().copied().collect();
            assert_close(&weights, &reversed);
        }
    }

    #[test]
    fn constant_series_stays_constant() {
        let out = smooth(&[4.0; 20], 5, Kernel::Hanning).unwrap();
        assert!(out.iter().all(|v| (v - 4.0).abs() < 1e-12));
    }

    #[test]
    fn kernel_names_parse() {
        assert_eq!("flat".parse::<Kernel>().unwrap(), Kernel::Flat);
        assert_eq!("Hanning".parse::<Kernel>().unwrap(), Kernel::Hanning);
        assert_eq!(Kernel::Blackman.to_string(), "blackman");
        assert!("gaussian".parse::<Kernel>().is_err());
    }
}
