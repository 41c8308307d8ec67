//! Nonlinear complexity measures of one epoch.
//!
//! - permutation entropy (Bandt & Pompe), normalised to [0, 1]
//! - Higuchi fractal dimension
//! - zero-crossing count
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};

/// Complexity features of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexityFeatures {
    pub perm: f64,
    pub higuchi: f64,
    /// Stored as `f64` so it fits the feature table; always integral.
    pub nzc: f64,
}

impl ComplexityFeatures {
    pub const NAMES: [&'static str; 3] = ["eeg_perm", "eeg_higuchi", "eeg_nzc"];

    pub fn to_array(&self) -> [f64; 3] {
        [self.perm, self.higuchi, self.nzc]
    }
}

/// Normalised permutation entropy.
///
/// Each window of `order` samples spaced `delay` apart is mapped to the
/// permutation that sorts it (ties keep their original order).  Returns the
/// Shannon entropy of the pattern distribution in bits divided by
/// `log2(order!)`.  `NaN` when `order < 2`, `delay == 0` or the epoch holds
/// no complete window.
pub fn perm_entropy(x: ArrayView1<'_, f64>, order: usize, delay: usize) -> f64 {
    if order < 2 || delay == 0 {
        return f64::NAN;
    }
    let span = (order - 1) * delay;
    if x.len() <= span {
        return f64::NAN;
    }
    let n_windows = x.len() - span;

    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut idx: Vec<usize> = Vec::with_capacity(order);
    for i in 0..n_windows {
        idx.clear();
        idx.extend(0..order);
        idx.sort_by(|&a, &b| x[i + a * delay].total_cmp(&x[i + b * delay]));
        let hash = idx.iter().fold(0, |h, &j| h * order + j);
        *counts.entry(hash).or_insert(0) += 1;
    }

    let n = n_windows as f64;
    let pe: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    let max_pe = (2..=order).map(|k| (k as f64).log2()).sum::<f64>();
    pe / max_pe
}

/// Higuchi fractal dimension with intervals `k = 1..=kmax`.
///
/// For each `k`, the normalised curve length `L(k)` is averaged over the
/// `k` possible offsets; the dimension is the least-squares slope of
/// `ln L(k)` against `ln(1/k)`.  Each offset sums the first `n_max - 1`
/// increments, where `n_max = floor((n - m - 1) / k)`, as `antropy` does.  `NaN` when any `L(k)` is zero (flat
/// epoch) or the epoch is too short for `kmax`.
pub fn higuchi_fd(x: ArrayView1<'_, f64>, kmax: usize) -> f64 {
    let n = x.len();
    if kmax < 2 || n < kmax + 2 {
        return f64::NAN;
    }

    let mut log_inv_k = Vec::with_capacity(kmax);
    let mut log_lk = Vec::with_capacity(kmax);

    for k in 1..=kmax {
        let mut lm = 0.0;
        for m in 0..k {
            let n_max = (n - m - 1) / k;
            let ll: f64 = (1..n_max)
                .map(|j| (x[m + j * k] - x[m + (j - 1) * k]).abs())
                .sum();
            lm += ll / k as f64 * (n - 1) as f64 / (k * n_max) as f64;
        }
        let lk = lm / k as f64;
        if lk.is_nan() || lk <= 0.0 {
            return f64::NAN;
        }
        log_inv_k.push((1.0 / k as f64).ln());
        log_lk.push(lk.ln());
    }

    slope(&log_inv_k, &log_lk)
}

/// Ordinary least-squares slope of `y` on `x`.
fn slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let sx: f64 = x.iter().sum();
    let sy: f64 = y.iter().sum();
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    (n * sxy - sx * sy) / (n * sxx - sx * sx)
}

/// Number of sign changes in `x`.
///
/// Exact zeros carry no sign of their own: they inherit the sign of the
/// previous nonzero sample, and leading zeros are skipped.
pub fn zero_crossings(x: ArrayView1<'_, f64>) -> usize {
    let mut prev: Option<bool> = None;
    let mut count = 0;
    for &v in x.iter() {
        if v == 0.0 || v.is_nan() {
            continue;
        }
        let pos = v > 0.0;
        if prev.is_some_and(|p| p != pos) {
            count += 1;
        }
        prev = Some(pos);
    }
    count
}

/// Complexity features of a single epoch.
pub fn complexity_features(
    x: ArrayView1<'_, f64>,
    perm_order: usize,
    perm_delay: usize,
    higuchi_kmax: usize,
) -> ComplexityFeatures {
    ComplexityFeatures {
        perm: perm_entropy(x, perm_order, perm_delay),
        higuchi: higuchi_fd(x, higuchi_kmax),
        nzc: zero_crossings(x) as f64,
    }
}

/// Complexity features for every row of `epochs` ([E, T]).
pub fn extract_complexity(
    epochs: &Array2<f64>,
    perm_order: usize,
    perm_delay: usize,
    higuchi_kmax: usize,
) -> Vec<ComplexityFeatures> {
    epochs
        .axis_iter(Axis(0))
        .map(|x| complexity_features(x, perm_order, perm_delay, higuchi_kmax))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    /// Deterministic pseudo-random sequence in [-1, 1).
    fn lcg_noise(n: usize, seed: u64) -> Array1<f64> {
        let mut s = seed;
        Array1::from_shape_fn(n, |_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (s >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
        })
    }

    #[test]
    fn perm_entropy_monotonic_is_zero() {
        let x = Array1::from_shape_fn(100, |i| i as f64);
        approx::assert_abs_diff_eq!(perm_entropy(x.view(), 3, 1), 0.0);
    }

    #[test]
    fn perm_entropy_constant_is_zero() {
        let x = Array1::from_elem(100, 1.0);
        approx::assert_abs_diff_eq!(perm_entropy(x.view(), 3, 1), 0.0);
    }

    #[test]
    fn perm_entropy_two_equal_patterns() {
        // Up-down zigzag: windows alternate between two patterns → 1 bit.
        let x = array![0.0, 2.0, 1.0, 3.0, 2.0, 4.0, 3.0, 5.0];
        let pe = perm_entropy(x.view(), 3, 1);
        approx::assert_abs_diff_eq!(pe, 1.0 / 6.0_f64.log2(), epsilon = 1e-12);
    }

    #[test]
    fn perm_entropy_noise_near_one() {
        let x = lcg_noise(3000, 7);
        let pe = perm_entropy(x.view(), 3, 1);
        assert!(pe > 0.98 && pe <= 1.0, "pe = {pe}");
    }

    #[test]
    fn perm_entropy_invalid_params() {
        let x = lcg_noise(10, 1);
        assert!(perm_entropy(x.view(), 1, 1).is_nan());
        assert!(perm_entropy(x.view(), 3, 0).is_nan());
        assert!(perm_entropy(x.view(), 3, 5).is_nan());
    }

    #[test]
    fn higuchi_line_is_one() {
        let x = Array1::from_shape_fn(1000, |i| i as f64 * 0.3);
        approx::assert_abs_diff_eq!(higuchi_fd(x.view(), 10), 1.0, epsilon = 1e-2);
    }

    #[test]
    fn higuchi_pinned_value() {
        // Reference from antropy's `_higuchi_fd` loop on the same sequence.
        let x = Array1::from_shape_fn(64, |i| ((i * i) % 17) as f64);
        approx::assert_abs_diff_eq!(higuchi_fd(x.view(), 10), 1.9286931684189672, epsilon = 1e-9);
    }

    #[test]
    fn higuchi_noise_near_two() {
        let x = lcg_noise(3000, 11);
        let d = higuchi_fd(x.view(), 10);
        assert!(d > 1.9 && d < 2.1, "hfd = {d}");
    }

    #[test]
    fn higuchi_flat_is_nan() {
        let x = Array1::zeros(500);
        assert!(higuchi_fd(x.view(), 10).is_nan());
        assert!(higuchi_fd(lcg_noise(8, 3).view(), 10).is_nan());
    }

    #[test]
    fn zero_crossings_basic() {
        assert_eq!(zero_crossings(array![1.0, -1.0, 1.0, -1.0].view()), 3);
        assert_eq!(zero_crossings(array![1.0, 2.0, 3.0].view()), 0);
    }

    #[test]
    fn zero_samples_inherit_previous_sign() {
        // + 0 + : no crossing;  + 0 − : one crossing.
        assert_eq!(zero_crossings(array![1.0, 0.0, 1.0].view()), 0);
        assert_eq!(zero_crossings(array![1.0, 0.0, 0.0, -1.0].view()), 1);
        // Leading zeros carry no sign.
        assert_eq!(zero_crossings(array![0.0, 0.0, -1.0, 1.0].view()), 1);
        assert_eq!(zero_crossings(Array1::zeros(10).view()), 0);
    }
}
