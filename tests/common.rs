/// Shared helpers: deterministic synthetic sleep EEG.
use ndarray::{Array1, ArrayView1};
use std::f64::consts::PI;

/// Deterministic pseudo-random samples in [-1, 1).
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

#[allow(unused)]
/// `minutes` of synthetic EEG at `sf` Hz.
///
/// A slow envelope alternates delta-dominant and alpha-dominant stretches so
/// that features differ between epochs; broadband noise keeps every epoch
/// non-degenerate.
pub fn synthetic_eeg(minutes: f64, sf: f64, seed: u64) -> Array1<f64> {
    let n = (minutes * 60.0 * sf).round() as usize;
    let mut rng = Lcg::new(seed);
    Array1::from_shape_fn(n, |i| {
        let t = i as f64 / sf;
        let env = 0.5 + 0.5 * (2.0 * PI * t / 240.0).sin();
        let delta = 40.0 * env * (2.0 * PI * 1.5 * t).sin();
        let alpha = 15.0 * (1.0 - env) * (2.0 * PI * 10.0 * t).sin();
        let sigma = 5.0 * (2.0 * PI * 13.0 * t).sin();
        delta + alpha + sigma + 8.0 * rng.next_f64()
    })
}

#[allow(unused)]
/// Maximum absolute difference, treating two NaNs as equal.
pub fn max_abs_diff(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| if x.is_nan() && y.is_nan() { 0.0 } else { (x - y).abs() })
        .fold(0.0_f64, f64::max)
}

#[allow(unused)]
/// Root-mean-square of a slice.
pub fn rms(x: &[f64]) -> f64 {
    (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
}
