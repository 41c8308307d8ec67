//! Per-epoch feature extraction.
//!
//! - [`time_domain`]: descriptive statistics
//! - [`spectral`]: Welch PSD, band powers, ratios, total power
//! - [`complexity`]: permutation entropy, Higuchi FD, zero crossings
//!
//! Each extractor is a pure function of one epoch's samples returning a
//! fixed-shape record; the three write disjoint columns and may run in any
//! order.

pub mod complexity;
pub mod spectral;
pub mod time_domain;

pub use complexity::{extract_complexity, higuchi_fd, perm_entropy, zero_crossings, ComplexityFeatures};
pub use spectral::{bandpower, extract_spectral, median_bias, Band, SpectralFeatures, Welch, BANDS};
pub use time_domain::{extract_time_domain, time_domain_features, TimeDomainFeatures};

use ndarray::Array2;

use crate::config::StagingConfig;
use crate::epoch::Epochs;

/// Number of raw `eeg_*` columns.
pub const N_RAW: usize =
    TimeDomainFeatures::NAMES.len() + SpectralFeatures::NAMES.len() + ComplexityFeatures::NAMES.len();

/// Raw `eeg_*` column names, in table order.
pub fn raw_feature_names() -> Vec<&'static str> {
    TimeDomainFeatures::NAMES
        .iter()
        .chain(SpectralFeatures::NAMES.iter())
        .chain(ComplexityFeatures::NAMES.iter())
        .copied()
        .collect()
}

/// Raw features of every epoch, `[n_epochs, N_RAW]`, columns in
/// [`raw_feature_names`] order.
pub fn extract_raw_features(epochs: &Epochs, sfreq: f64, cfg: &StagingConfig) -> Array2<f64> {
    let td = extract_time_domain(&epochs.data);
    let sp = extract_spectral(
        &epochs.data,
        sfreq,
        cfg.window_samples(sfreq),
        cfg.broad_band,
        cfg.relative_band_power,
    );
    let cx = extract_complexity(&epochs.data, cfg.perm_order, cfg.perm_delay, cfg.higuchi_kmax);

    let mut out = Array2::<f64>::zeros((epochs.n_epochs(), N_RAW));
    for (e, mut row) in out.rows_mut().into_iter().enumerate() {
        let values = td[e]
            .to_array()
            .into_iter()
            .chain(sp[e].to_array())
            .chain(cx[e].to_array());
        for (dst, v) in row.iter_mut().zip(values) {
            *dst = v;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_prefixed() {
        let names = raw_feature_names();
        assert_eq!(names.len(), N_RAW);
        assert_eq!(N_RAW, 21);
        assert!(names.iter().all(|n| n.starts_with("eeg_")));
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
