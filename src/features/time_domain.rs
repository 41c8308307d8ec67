//! Per-epoch descriptive statistics.
//!
//! Skewness and kurtosis use the biased (population) moment estimators,
//! as `scipy.stats.skew` / `scipy.stats.kurtosis(fisher=True)` do.  Both
//! are `NaN` for a zero-variance epoch.
use ndarray::{Array2, ArrayView1, Axis};

use crate::normalize::{percentile_sorted, sorted_non_nan};

/// Descriptive statistics of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeDomainFeatures {
    /// Mean of |x|.
    pub absmean: f64,
    /// Sample standard deviation (ddof = 1).
    pub std: f64,
    pub p10: f64,
    pub p90: f64,
    /// 75th − 25th percentile.
    pub iqr: f64,
    pub skew: f64,
    /// Excess kurtosis (normal distribution → 0).
    pub kurt: f64,
}

impl TimeDomainFeatures {
    pub const NAMES: [&'static str; 7] = [
        "eeg_absmean",
        "eeg_std",
        "eeg_10p",
        "eeg_90p",
        "eeg_iqr",
        "eeg_skew",
        "eeg_kurt",
    ];

    pub fn to_array(&self) -> [f64; 7] {
        [self.absmean, self.std, self.p10, self.p90, self.iqr, self.skew, self.kurt]
    }
}

/// Compute the statistics of a single epoch.
pub fn time_domain_features(x: ArrayView1<'_, f64>) -> TimeDomainFeatures {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let absmean = x.iter().map(|v| v.abs()).sum::<f64>() / n;

    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in x.iter() {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let std = (m2 / (n - 1.0)).sqrt();
    m2 /= n;
    m3 /= n;
    m4 /= n;

    // Same zero-variance guard as scipy: m2 <= (resolution · mean)².
    let degenerate = m2 <= (1e-15 * mean).powi(2);
    let (skew, kurt) = if degenerate {
        (f64::NAN, f64::NAN)
    } else {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    };

    let sorted = sorted_non_nan(x.iter());
    TimeDomainFeatures {
        absmean,
        std,
        p10: percentile_sorted(&sorted, 10.0),
        p90: percentile_sorted(&sorted, 90.0),
        iqr: percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0),
        skew,
        kurt,
    }
}

/// Statistics for every row of `epochs` ([E, T]).
pub fn extract_time_domain(epochs: &Array2<f64>) -> Vec<TimeDomainFeatures> {
    epochs.axis_iter(Axis(0)).map(time_domain_features).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn simple_sequence() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let f = time_domain_features(x.view());
        approx::assert_abs_diff_eq!(f.absmean, 3.0);
        approx::assert_abs_diff_eq!(f.std, 2.5_f64.sqrt(), epsilon = 1e-12);
        approx::assert_abs_diff_eq!(f.p10, 1.4, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(f.p90, 4.6, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(f.iqr, 2.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(f.skew, 0.0, epsilon = 1e-12);
        // Uniform 1..5: m4/m2² = 6.8/4 = 1.7.
        approx::assert_abs_diff_eq!(f.kurt, -1.3, epsilon = 1e-12);
    }

    #[test]
    fn absmean_uses_magnitude() {
        let x = array![-2.0, 2.0, -2.0, 2.0];
        approx::assert_abs_diff_eq!(time_domain_features(x.view()).absmean, 2.0);
    }

    #[test]
    fn right_tail_has_positive_skew() {
        let x = array![0.0, 0.0, 0.0, 0.0, 10.0];
        assert!(time_domain_features(x.view()).skew > 1.0);
    }

    #[test]
    fn constant_epoch_gives_nan_moments() {
        let x = Array1::from_elem(3000, 0.0);
        let f = time_domain_features(x.view());
        assert_eq!(f.std, 0.0);
        assert_eq!(f.iqr, 0.0);
        assert!(f.skew.is_nan());
        assert!(f.kurt.is_nan());

        let x = Array1::from_elem(300, 0.5);
        let f = time_domain_features(x.view());
        assert!(f.skew.is_nan() && f.kurt.is_nan());
    }

    #[test]
    fn one_record_per_row() {
        let epochs = Array2::from_shape_fn((4, 50), |(e, t)| (e * t) as f64);
        assert_eq!(extract_time_domain(&epochs).len(), 4);
    }
}
