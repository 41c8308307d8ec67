//! FIR band-pass design following MNE's `filter_data(..., method='fir')`.
//!
//! For a band-pass `[l_freq, h_freq]` Hz at sampling rate `sfreq`:
//!   • lower transition = min(max(0.25 · l_freq, 2.0), l_freq)
//!   • upper transition = min(max(0.25 · h_freq, 2.0), sfreq/2 − h_freq)
//!   • filter length N  = ceil(3.3 · sfreq / min(transitions)), rounded to odd
//!   • each edge is a Hamming-windowed sinc lowpass cut at the midpoint of
//!     its transition, with its own length round(3.3 · sfreq / transition)
//!   • h = lowpass(high edge) − lowpass(low edge), both centred in N
use std::f64::consts::PI;

use crate::error::{Result, StagingError};

/// MNE-compatible lower transition bandwidth.
///
/// Rule: `min(max(0.25 * l_freq, 2.0), l_freq)`
pub fn lower_trans_bandwidth(l_freq: f64) -> f64 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// MNE-compatible upper transition bandwidth.
///
/// Rule: `min(max(0.25 * h_freq, 2.0), sfreq / 2 - h_freq)`
pub fn upper_trans_bandwidth(h_freq: f64, sfreq: f64) -> f64 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Number of taps for the narrowest transition band, always odd.
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

/// Check that `0 < low < high < sfreq / 2`.
pub fn check_band(low: f64, high: f64, sfreq: f64) -> Result<()> {
    let nyq = sfreq / 2.0;
    let ok = low.is_finite() && high.is_finite() && low > 0.0 && low < high && high < nyq;
    if ok {
        Ok(())
    } else {
        Err(StagingError::InvalidFilterBand { low, high, sfreq })
    }
}

/// Taps of the lowpass realising one transition band, always odd.
///
/// Formula: `round(3.3 / (trans_bw / sfreq))` with ties to even, then
/// rounded up to odd.
pub fn edge_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let transition = trans_bw / (sfreq / 2.0) / 2.0;
    let n = (3.3 / transition).round_ties_even() as usize;
    n + (1 - n % 2)
}

/// Design a zero-phase band-pass FIR filter.
///
/// Returns the impulse response `h[N]` with `N` odd.  Fails with
/// [`StagingError::InvalidFilterBand`] if the band is empty or reaches
/// outside `(0, sfreq / 2)`.
pub fn design_bandpass(l_freq: f64, h_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_band(l_freq, h_freq, sfreq)?;

    let l_trans = lower_trans_bandwidth(l_freq);
    let h_trans = upper_trans_bandwidth(h_freq, sfreq);
    let n = auto_filter_length(l_trans.min(h_trans), sfreq);

    let mut h = vec![0.0_f64; n];
    let edges = [
        (h_freq + h_trans / 2.0, h_trans, 1.0),
        (l_freq - l_trans / 2.0, l_trans, -1.0),
    ];
    for (cutoff, trans, sign) in edges {
        let lp = firwin(edge_filter_length(trans, sfreq).min(n), cutoff, sfreq);
        let offset = (n - lp.len()) / 2;
        for (dst, v) in h[offset..offset + lp.len()].iter_mut().zip(&lp) {
            *dst += sign * v;
        }
    }
    Ok(h)
}

/// Hamming-windowed sinc lowpass of `n` taps with unit DC gain.
///
/// `cutoff_hz` is the -6 dB point.  `n` must be odd.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64) -> Vec<f64> {
    debug_assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let fc = cutoff_hz / (sfreq / 2.0);

    let win = hamming(n);

    let mut h: Vec<f64> = win
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let x = i as f64 - alpha;
            // lim_{x→0} sin(π·fc·x) / (π·x) = fc
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * w
        })
        .collect();

    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);
    h
}

/// Symmetric Hamming window of length `n` (filter design).
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Periodic Hamming window of length `n` (spectral analysis).
///
/// Equals the first `n` points of a symmetric window of length `n + 1`.
pub fn hamming_periodic(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_bandwidths() {
        approx::assert_abs_diff_eq!(lower_trans_bandwidth(0.5), 0.5);
        approx::assert_abs_diff_eq!(lower_trans_bandwidth(12.0), 3.0);
        approx::assert_abs_diff_eq!(upper_trans_bandwidth(40.0, 256.0), 10.0);
        // Close to Nyquist the upper transition is limited by the headroom.
        approx::assert_abs_diff_eq!(upper_trans_bandwidth(40.0, 100.0), 10.0);
        approx::assert_abs_diff_eq!(upper_trans_bandwidth(40.0, 84.0), 2.0);
    }

    #[test]
    fn bandpass_length_is_odd_and_known() {
        // 0.5 Hz lower transition dominates: ceil(3.3 / 0.5 * 100) = 660 → 661.
        let h = design_bandpass(0.5, 40.0, 100.0).unwrap();
        assert_eq!(h.len(), 661);
        let h = design_bandpass(1.0, 30.0, 256.0).unwrap();
        assert!(h.len() % 2 == 1);
    }

    #[test]
    fn bandpass_blocks_dc_and_is_symmetric() {
        let h = design_bandpass(0.5, 40.0, 128.0).unwrap();
        let s: f64 = h.iter().sum();
        assert!(s.abs() < 1e-9, "bandpass DC gain = {s}");
        let n = h.len();
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-12);
        }
    }

    fn gain(h: &[f64], f: f64, sfreq: f64) -> f64 {
        let w = 2.0 * PI * f / sfreq;
        let (re, im) = h.iter().enumerate().fold((0.0, 0.0), |(re, im), (i, &v)| {
            (re + v * (w * i as f64).cos(), im - v * (w * i as f64).sin())
        });
        re.hypot(im)
    }

    #[test]
    fn edge_lengths_follow_their_own_transition() {
        // 3.3 · 256 / 10 = 84.48 → 84 → 85;  3.3 · 256 / 0.5 = 1689.6 → 1690 → 1691.
        assert_eq!(edge_filter_length(10.0, 256.0), 85);
        assert_eq!(edge_filter_length(0.5, 256.0), 1691);
        assert_eq!(design_bandpass(0.5, 40.0, 256.0).unwrap().len(), 1691);
    }

    #[test]
    fn upper_edge_has_its_wide_transition() {
        // 40 Hz edge, 10 Hz transition: -6 dB at 45 Hz, stop band from 50 Hz.
        let sf = 256.0;
        let h = design_bandpass(0.5, 40.0, sf).unwrap();
        approx::assert_abs_diff_eq!(gain(&h, 30.0, sf), 1.0, epsilon = 5e-3);
        approx::assert_abs_diff_eq!(gain(&h, 45.0, sf), 0.5, epsilon = 1e-2);
        let g43 = gain(&h, 43.0, sf);
        assert!(g43 > 0.7 && g43 < 0.9, "gain at 43 Hz = {g43}");
        assert!(gain(&h, 50.0, sf) < 1e-2);
        assert!(gain(&h, 55.0, sf) < 1e-3);
        // Lower edge: -6 dB at 0.25 Hz.
        approx::assert_abs_diff_eq!(gain(&h, 0.25, sf), 0.5, epsilon = 1e-2);
    }

    #[test]
    fn invalid_bands_rejected() {
        for (l, h) in [(0.0, 40.0), (10.0, 10.0), (20.0, 5.0), (0.5, 50.0), (-1.0, 30.0)] {
            assert!(
                matches!(design_bandpass(l, h, 100.0), Err(StagingError::InvalidFilterBand { .. })),
                "accepted [{l}, {h}]"
            );
        }
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = firwin(101, 10.0, 256.0);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn periodic_window_starts_at_minimum() {
        let w = hamming_periodic(8);
        approx::assert_abs_diff_eq!(w[0], 0.08, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-12);
    }
}
