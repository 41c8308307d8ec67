//! Spectral features: median-averaged Welch PSD, band powers, power ratios
//! and total broadband power.
//!
//! PSD estimate matches `scipy.signal.welch(x, sf, window='hamming',
//! nperseg=win, average='median')`:
//!
//! ```text
//! PSD[k] = median_s |FFT(w · (x_s − mean(x_s)))[k]|² · c_k / (fs · Σw²) / bias(S)
//! ```
//!
//! with a periodic Hamming window `w`, 50 % overlap, `c_k = 2` except at DC
//! and the Nyquist bin, and `bias(S)` the median bias for `S` segments.
//!
//! Band edges and the ratio set are fixed conventions for sleep staging;
//! changing them changes feature semantics.
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, Axis};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::filter::hamming_periodic;

/// A named frequency band, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Band {
    pub const fn new(name: &'static str, low_hz: f64, high_hz: f64) -> Self {
        Self { name, low_hz, high_hz }
    }
}

/// Canonical sleep-EEG bands, in column order.
pub const BANDS: [Band; 6] = [
    Band::new("delta", 0.5, 4.0),
    Band::new("theta", 4.0, 8.0),
    Band::new("alpha", 8.0, 12.0),
    Band::new("sigma", 12.0, 16.0),
    Band::new("beta", 16.0, 30.0),
    Band::new("gamma", 30.0, 40.0),
];

/// Welch PSD estimator with a reusable FFT plan and window.
pub struct Welch {
    sfreq: f64,
    nperseg: usize,
    step: usize,
    window: Vec<f64>,
    scale: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl Welch {
    /// `nperseg` is clamped to `[1, max_len]`.
    pub fn new(sfreq: f64, nperseg: usize, max_len: usize) -> Self {
        let nperseg = nperseg.min(max_len).max(1);
        let window = hamming_periodic(nperseg);
        let win_pow: f64 = window.iter().map(|w| w * w).sum();
        let fft = FftPlanner::<f64>::new().plan_fft_forward(nperseg);
        Self {
            sfreq,
            nperseg,
            step: nperseg - nperseg / 2,
            window,
            scale: 1.0 / (sfreq * win_pow),
            fft,
        }
    }

    pub fn nperseg(&self) -> usize {
        self.nperseg
    }

    /// One-sided frequency grid, `k · sf / nperseg` for `k = 0..=nperseg/2`.
    pub fn freqs(&self) -> Vec<f64> {
        (0..=self.nperseg / 2)
            .map(|k| k as f64 * self.sfreq / self.nperseg as f64)
            .collect()
    }

    /// Frequency resolution in Hz.
    pub fn resolution(&self) -> f64 {
        self.sfreq / self.nperseg as f64
    }

    /// Median-averaged PSD of `x`, one value per entry of [`Welch::freqs`].
    pub fn psd(&self, x: ArrayView1<'_, f64>) -> Vec<f64> {
        let n_freq = self.nperseg / 2 + 1;
        if x.len() < self.nperseg {
            return vec![f64::NAN; n_freq];
        }
        let n_seg = (x.len() - self.nperseg) / self.step + 1;
        let even = self.nperseg % 2 == 0;

        // periodograms[k][s]
        let mut periodograms = vec![Vec::with_capacity(n_seg); n_freq];
        let mut buf = vec![Complex::<f64>::default(); self.nperseg];

        for s in 0..n_seg {
            let seg = x.slice(ndarray::s![s * self.step..s * self.step + self.nperseg]);
            let mean = seg.sum() / self.nperseg as f64;
            for ((b, &v), &w) in buf.iter_mut().zip(seg.iter()).zip(self.window.iter()) {
                *b = Complex { re: (v - mean) * w, im: 0.0 };
            }
            self.fft.process(&mut buf);

            for (k, p) in periodograms.iter_mut().enumerate() {
                let mut v = buf[k].norm_sqr() * self.scale;
                if k != 0 && !(even && k == self.nperseg / 2) {
                    v *= 2.0;
                }
                p.push(v);
            }
        }

        let bias = median_bias(n_seg);
        periodograms
            .iter_mut()
            .map(|p| {
                p.sort_by(f64::total_cmp);
                median_of_sorted(p) / bias
            })
            .collect()
    }
}

/// Bias of the median of `n` χ²₂ periodogram values relative to their mean.
///
/// `1 + Σ_{k=1}^{(n−1)/2} (1/(2k+1) − 1/(2k))`
pub fn median_bias(n: usize) -> f64 {
    1.0 + (1..=(n.saturating_sub(1)) / 2)
        .map(|k| 1.0 / (2 * k + 1) as f64 - 1.0 / (2 * k) as f64)
        .sum::<f64>()
}

fn median_of_sorted(v: &[f64]) -> f64 {
    let n = v.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => v[n / 2],
        _ => 0.5 * (v[n / 2 - 1] + v[n / 2]),
    }
}

/// Trapezoidal integral of `psd` over bins with `low ≤ f ≤ high`, using the
/// constant spacing `dx`.  Fewer than two bins integrate to 0.
pub fn bandpower(psd: &[f64], freqs: &[f64], low: f64, high: f64, dx: f64) -> f64 {
    let sel: Vec<f64> = freqs
        .iter()
        .zip(psd.iter())
        .filter(|(&f, _)| f >= low && f <= high)
        .map(|(_, &p)| p)
        .collect();
    sel.windows(2).map(|w| 0.5 * (w[0] + w[1]) * dx).sum()
}

/// `num / den`, or `NaN` when `den` is zero.
pub fn power_ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { f64::NAN } else { num / den }
}

/// Spectral features of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralFeatures {
    /// Band powers in [`BANDS`] order.
    pub bands: [f64; 6],
    /// delta / theta
    pub dt: f64,
    /// delta / sigma
    pub ds: f64,
    /// delta / beta
    pub db: f64,
    /// alpha / theta
    pub at: f64,
    /// Power over the broad preprocessing band.
    pub abspow: f64,
}

impl SpectralFeatures {
    pub const NAMES: [&'static str; 11] = [
        "eeg_delta",
        "eeg_theta",
        "eeg_alpha",
        "eeg_sigma",
        "eeg_beta",
        "eeg_gamma",
        "eeg_dt",
        "eeg_ds",
        "eeg_db",
        "eeg_at",
        "eeg_abspow",
    ];

    /// Derive band powers, ratios and total power from one PSD.
    pub fn from_psd(psd: &[f64], freqs: &[f64], broad_band: (f64, f64), relative: bool) -> Self {
        let dx = if freqs.len() > 1 { freqs[1] - freqs[0] } else { 0.0 };

        let mut bands = BANDS.map(|b| bandpower(psd, freqs, b.low_hz, b.high_hz, dx));
        if relative {
            let total = bandpower(psd, freqs, BANDS[0].low_hz, BANDS[5].high_hz, dx);
            bands.iter_mut().for_each(|b| *b = power_ratio(*b, total));
        }
        let [delta, theta, alpha, sigma, beta, _gamma] = bands;

        Self {
            bands,
            dt: power_ratio(delta, theta),
            ds: power_ratio(delta, sigma),
            db: power_ratio(delta, beta),
            at: power_ratio(alpha, theta),
            abspow: bandpower(psd, freqs, broad_band.0, broad_band.1, dx),
        }
    }

    pub fn to_array(&self) -> [f64; 11] {
        let b = self.bands;
        [b[0], b[1], b[2], b[3], b[4], b[5], self.dt, self.ds, self.db, self.at, self.abspow]
    }
}

/// Spectral features for every row of `epochs` ([E, T]).
pub fn extract_spectral(
    epochs: &Array2<f64>,
    sfreq: f64,
    window_samples: usize,
    broad_band: (f64, f64),
    relative: bool,
) -> Vec<SpectralFeatures> {
    let welch = Welch::new(sfreq, window_samples, epochs.ncols());
    log::debug!(
        "welch: nperseg={} resolution={:.3} Hz",
        welch.nperseg(),
        welch.resolution()
    );
    let freqs = welch.freqs();
    epochs
        .axis_iter(Axis(0))
        .map(|x| SpectralFeatures::from_psd(&welch.psd(x), &freqs, broad_band, relative))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::f64::consts::PI;

    fn sine(freq: f64, amp: f64, sf: f64, n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |i| amp * (2.0 * PI * freq * i as f64 / sf).sin())
    }

    #[test]
    fn median_bias_values() {
        approx::assert_abs_diff_eq!(median_bias(1), 1.0);
        approx::assert_abs_diff_eq!(median_bias(2), 1.0);
        approx::assert_abs_diff_eq!(median_bias(3), 1.0 + 1.0 / 3.0 - 0.5, epsilon = 1e-15);
    }

    #[test]
    fn freq_grid() {
        let w = Welch::new(100.0, 400, 3000);
        let f = w.freqs();
        assert_eq!(f.len(), 201);
        approx::assert_abs_diff_eq!(f[1], 0.25);
        approx::assert_abs_diff_eq!(f[200], 50.0);
    }

    #[test]
    fn window_clamped_to_epoch() {
        let w = Welch::new(100.0, 5000, 3000);
        assert_eq!(w.nperseg(), 3000);
    }

    #[test]
    fn sine_power_is_preserved() {
        // A sine of amplitude A has power A²/2.  Every segment holds a whole
        // number of cycles, so the median equals each periodogram and the
        // bias correction scales it by 1 / bias(14).
        let sf = 100.0;
        let x = sine(10.0, 2.0, sf, 3000);
        let w = Welch::new(sf, 400, 3000);
        let psd = w.psd(x.view());
        let freqs = w.freqs();
        let total = bandpower(&psd, &freqs, 0.0, 50.0, w.resolution());
        approx::assert_relative_eq!(total, 2.0 / median_bias(14), max_relative = 0.02);

        let peak = psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| freqs[k])
            .unwrap();
        approx::assert_abs_diff_eq!(peak, 10.0);
    }

    #[test]
    fn band_features_follow_dominant_rhythm() {
        let sf = 128.0;
        let x = sine(2.0, 1.0, sf, 3840) + &sine(10.0, 0.1, sf, 3840);
        let w = Welch::new(sf, 512, 3840);
        let f = SpectralFeatures::from_psd(&w.psd(x.view()), &w.freqs(), (0.5, 40.0), false);
        assert!(f.bands[0] > 10.0 * f.bands[2], "delta should dominate: {:?}", f.bands);
        approx::assert_abs_diff_eq!(f.dt, f.bands[0] / f.bands[1], epsilon = 1e-12);
        approx::assert_abs_diff_eq!(f.at, f.bands[2] / f.bands[1], epsilon = 1e-12);
        assert!(f.abspow >= f.bands[0]);
    }

    #[test]
    fn relative_bands_sum_near_one() {
        let sf = 128.0;
        let x = sine(6.0, 1.0, sf, 3840) + &sine(20.0, 0.5, sf, 3840);
        let w = Welch::new(sf, 512, 3840);
        let f = SpectralFeatures::from_psd(&w.psd(x.view()), &w.freqs(), (0.5, 40.0), true);
        // Adjacent bands share edge bins but no trapezoid intervals.
        let s: f64 = f.bands.iter().sum();
        approx::assert_abs_diff_eq!(s, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_signal_gives_nan_ratios() {
        let x = Array1::zeros(3000);
        let w = Welch::new(100.0, 400, 3000);
        let f = SpectralFeatures::from_psd(&w.psd(x.view()), &w.freqs(), (0.5, 40.0), false);
        assert!(f.bands.iter().all(|&b| b == 0.0));
        assert!(f.dt.is_nan() && f.ds.is_nan() && f.db.is_nan() && f.at.is_nan());
        assert_eq!(f.abspow, 0.0);
    }

    #[test]
    fn trapezoid_on_flat_psd() {
        let freqs: Vec<f64> = (0..=10).map(|k| k as f64 * 0.5).collect();
        let psd = vec![2.0; 11];
        // Bins 1.0..=4.0 → 7 points, 6 intervals of 0.5 × 2.0.
        approx::assert_abs_diff_eq!(bandpower(&psd, &freqs, 1.0, 4.0, 0.5), 6.0);
        assert_eq!(bandpower(&psd, &freqs, 1.1, 1.2, 0.5), 0.0);
    }
}
