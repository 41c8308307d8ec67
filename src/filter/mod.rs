//! FIR filter design and application.
//!
//! - [`design`]: Hamming-windowed sinc band-pass FIR design, matching
//!   `mne.filter.filter_data(l_freq, h_freq, fir_window='hamming')`.
//! - [`apply`]: Overlap-add zero-phase convolution, matching MNE's
//!   `_overlap_add_filter` / `_1d_overlap_filter`.

pub mod apply;
pub mod design;

pub use apply::filter_zero_phase;
pub use design::{
    auto_filter_length, check_band, design_bandpass, edge_filter_length, firwin, hamming,
    hamming_periodic, lower_trans_bandwidth, upper_trans_bandwidth,
};

use crate::error::Result;

/// Band-pass `x` to `[l_freq, h_freq]` Hz with a zero-phase FIR filter.
pub fn bandpass(x: &[f64], sfreq: f64, l_freq: f64, h_freq: f64) -> Result<Vec<f64>> {
    let h = design_bandpass(l_freq, h_freq, sfreq)?;
    log::debug!("band-pass [{l_freq}, {h_freq}] Hz: {} taps", h.len());
    Ok(filter_zero_phase(x, &h))
}
