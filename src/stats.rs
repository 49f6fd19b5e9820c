use serde::Serialize;

/// Mean and population standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub average: f64,
    pub std: f64,
}

impl Statistics {
    pub fn of(vals: &[f64]) -> Self {
        let mut acc = Accumulator::new();
        vals.iter().for_each(|&val| acc.add(val));
        acc.report()
    }
}

/// Single-pass (Welford) accumulator.
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    /// Divides by `n`, not `n - 1`. Empty input gives `NaN` for both fields.
    pub fn report(&self) -> Statistics {
        if self.n_vals == 0 {
            return Statistics {
                average: f64::NAN,
                std: f64::NAN,
            };
        }
        Statistics {
            average: self.mean,
            std: (self.diff_2_sum / self.n_vals as f64).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_has_zero_std() {
        let stats = Statistics::of(&[2.5; 40]);
        assert_eq!(stats.average, 2.5);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn std_is_population_std() {
        let stats = Statistics::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.average - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_is_nan() {
        let stats = Statistics::of(&[]);
        assert!(stats.average.is_nan());
        assert!(stats.std.is_nan());
    }
}
