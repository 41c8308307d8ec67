//! Sleep-staging pipeline instance.
//!
//! [`SleepStaging`] owns one validated single-channel recording and a cached
//! feature table.  The cache has three operations:
//!
//! - compute: [`SleepStaging::fit`] recomputes the whole table and replaces it
//! - read:    [`SleepStaging::features`] / [`SleepStaging::get_features`]
//! - invalidate: [`SleepStaging::invalidate`]
//!
//! Stage prediction and scoring are delegated to [`Classifier`] and
//! [`Metric`] collaborators; labels are opaque strings.
use log::debug;
use ndarray::{Array1, ArrayView, Dimension};

use crate::config::StagingConfig;
use crate::epoch::sliding_window;
use crate::error::{Result, StagingError};
use crate::features::extract_raw_features;
use crate::filter::bandpass;
use crate::table::{assemble, FeatureTable};
use crate::validate::{validate_input, Metadata};

/// A trained model that assigns one stage label per epoch.
///
/// The classifier receives the full feature table; which columns it reads,
/// and in which order, is part of its own contract.
pub trait Classifier {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<String>>;
}

impl<F> Classifier for F
where
    F: Fn(&FeatureTable) -> Result<Vec<String>>,
{
    fn predict(&self, features: &FeatureTable) -> Result<Vec<String>> {
        self(features)
    }
}

/// Comparison of predicted against reference labels.
pub trait Metric {
    fn name(&self) -> &str;

    /// `y_true` and `y_pred` always have the same length when called by
    /// [`SleepStaging::score`].
    fn score(&self, y_true: &[String], y_pred: &[String]) -> f64;
}

/// Fraction of epochs whose predicted label equals the reference label.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Metric for Accuracy {
    fn name(&self) -> &str {
        "accuracy"
    }

    fn score(&self, y_true: &[String], y_pred: &[String]) -> f64 {
        if y_true.is_empty() {
            return f64::NAN;
        }
        let hits = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
        hits as f64 / y_true.len() as f64
    }
}

/// Feature extraction for one single-channel sleep recording.
///
/// ```no_run
/// use sleepstage::{Metadata, SleepStaging, StagingConfig};
/// use ndarray::Array1;
///
/// let eeg = Array1::<f64>::zeros(100 * 60 * 60); // 1 h at 100 Hz
/// let meta = Metadata::new(Some(45.0), Some(1)).unwrap();
/// let mut sls = SleepStaging::new(eeg.view(), 100.0, Some(meta)).unwrap();
///
/// let table = sls.get_features(None).unwrap();
/// assert_eq!(table.n_rows(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct SleepStaging {
    eeg: Array1<f64>,
    sfreq: f64,
    metadata: Option<Metadata>,
    features: Option<FeatureTable>,
    fitted_with: Option<StagingConfig>,
    predictions: Option<Vec<String>>,
}

impl SleepStaging {
    /// Validate and take ownership of a copy of `signal`.
    ///
    /// `signal` may have any number of axes as long as at most one is longer
    /// than 1.  Fails with `InvalidRate`, `InvalidSignal` or `InvalidMetadata`.
    pub fn new<D: Dimension>(
        signal: ArrayView<'_, f64, D>,
        sfreq: f64,
        metadata: Option<Metadata>,
    ) -> Result<Self> {
        let input = validate_input(signal.into_dyn(), sfreq, metadata)?;
        Ok(Self {
            eeg: input.signal,
            sfreq: input.sfreq,
            metadata: input.metadata,
            features: None,
            fitted_with: None,
            predictions: None,
        })
    }

    /// Convenience constructor from a flat slice.
    pub fn from_slice(signal: &[f64], sfreq: f64, metadata: Option<Metadata>) -> Result<Self> {
        Self::new(ndarray::aview1(signal), sfreq, metadata)
    }

    pub fn sfreq(&self) -> f64 {
        self.sfreq
    }

    pub fn signal(&self) -> &Array1<f64> {
        &self.eeg
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Configuration of the cached table, if any.
    pub fn fitted_config(&self) -> Option<&StagingConfig> {
        self.fitted_with.as_ref()
    }

    /// Compute the full feature table and replace the cached one.
    ///
    /// Steps: band-pass the whole recording, cut epochs, extract the raw
    /// time-domain / spectral / complexity features, then assemble the
    /// rolling, normalised and metadata columns.  Any previous predictions
    /// are discarded.  On error the previous cache is left untouched.
    pub fn fit(&mut self, cfg: &StagingConfig) -> Result<&FeatureTable> {
        let (low, high) = cfg.broad_band;
        let filtered = bandpass(
            self.eeg.as_slice().ok_or_else(|| StagingError::InvalidSignal("non-contiguous signal".into()))?,
            self.sfreq,
            low,
            high,
        )?;

        let epochs = sliding_window(&filtered, self.sfreq, cfg.epoch_seconds);
        debug!(
            "{} epochs of {} samples ({} trailing samples dropped)",
            epochs.n_epochs(),
            epochs.n_samples(),
            filtered.len() - epochs.n_epochs() * epochs.n_samples()
        );

        let raw = extract_raw_features(&epochs, self.sfreq, cfg);
        let table = assemble(&epochs, &raw, self.metadata.as_ref(), cfg)?;

        self.predictions = None;
        self.fitted_with = Some(cfg.clone());
        Ok(&*self.features.insert(table))
    }

    /// The cached table, without computing it.
    pub fn features(&self) -> Result<&FeatureTable> {
        self.features.as_ref().ok_or(StagingError::NotFitted)
    }

    /// A copy of the feature table, fitting first if nothing is cached.
    ///
    /// `cfg` is only used when the table has to be computed (defaults when
    /// `None`); an existing cache is returned as is.  Call [`fit`] to
    /// recompute with new settings.
    ///
    /// [`fit`]: SleepStaging::fit
    pub fn get_features(&mut self, cfg: Option<&StagingConfig>) -> Result<FeatureTable> {
        if let Some(table) = &self.features {
            return Ok(table.clone());
        }
        let default_cfg = StagingConfig::default();
        Ok(self.fit(cfg.unwrap_or(&default_cfg))?.clone())
    }

    /// Drop the cached table and predictions.
    pub fn invalidate(&mut self) {
        self.features = None;
        self.fitted_with = None;
        self.predictions = None;
    }

    /// Predict one stage label per epoch, fitting with defaults if needed.
    ///
    /// Fails with `LengthMismatch` if the classifier does not return exactly
    /// one label per row.
    pub fn predict(&mut self, classifier: &dyn Classifier) -> Result<Vec<String>> {
        if self.features.is_none() {
            self.fit(&StagingConfig::default())?;
        }
        let table = self.features()?;
        let labels = classifier.predict(table)?;
        if labels.len() != table.n_rows() {
            return Err(StagingError::LengthMismatch {
                expected: table.n_rows(),
                actual: labels.len(),
            });
        }
        self.predictions = Some(labels.clone());
        Ok(labels)
    }

    /// Labels returned by the last [`predict`](SleepStaging::predict) call.
    pub fn predictions(&self) -> Option<&[String]> {
        self.predictions.as_deref()
    }

    /// Score the last predictions against reference labels.
    pub fn score(&self, y_true: &[String], metric: &dyn Metric) -> Result<f64> {
        let y_pred = self.predictions.as_deref().ok_or(StagingError::NoPredictions)?;
        if y_true.len() != y_pred.len() {
            return Err(StagingError::LengthMismatch {
                expected: y_pred.len(),
                actual: y_true.len(),
            });
        }
        let s = metric.score(y_true, y_pred);
        debug!("{} = {s:.4} over {} epochs", metric.name(), y_true.len());
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accuracy_counts_matches() {
        let a = Accuracy.score(&labels(&["W", "N1", "N2", "R"]), &labels(&["W", "N2", "N2", "R"]));
        approx::assert_abs_diff_eq!(a, 0.75);
        assert!(Accuracy.score(&[], &[]).is_nan());
    }

    #[test]
    fn features_before_fit_is_not_fitted() {
        let eeg = Array1::<f64>::zeros(100 * 300);
        let sls = SleepStaging::new(eeg.view(), 100.0, None).unwrap();
        assert_eq!(sls.features().unwrap_err(), StagingError::NotFitted);
        assert_eq!(
            sls.score(&labels(&["W"]), &Accuracy).unwrap_err(),
            StagingError::NoPredictions
        );
    }
}
