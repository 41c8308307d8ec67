//! Input validation.
//!
//! Runs once, at construction, before any processing:
//!   • sampling rate must be finite and > 80 Hz (warns at ≥ 1000 Hz)
//!   • signal must squeeze to one dimension and last at least 5 minutes
//!   • metadata `age` must lie in (0, 120), `male` must normalise to 0 or 1
use log::warn;
use ndarray::{Array1, ArrayViewD};
use serde_json::Value;

use crate::error::{Result, StagingError};

/// Lowest accepted sampling rate (exclusive), in Hz.
pub const MIN_SFREQ: f64 = 80.0;
/// Sampling rate from which a downsampling advisory is logged, in Hz.
pub const HIGH_SFREQ: f64 = 1000.0;
/// Shortest accepted recording, in minutes.
pub const MIN_DURATION_MIN: f64 = 5.0;

/// Optional subject metadata appended to the feature table as constant columns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metadata {
    /// Age in years, strictly between 0 and 120.
    pub age: Option<f64>,
    /// Sex flag: 1 = male, 0 = female.
    pub male: Option<u8>,
}

impl Metadata {
    /// Build validated metadata from typed values.
    pub fn new(age: Option<f64>, male: Option<u8>) -> Result<Self> {
        let meta = Self { age, male };
        meta.check()?;
        Ok(meta)
    }

    /// Build validated metadata from a JSON object such as
    /// `{"age": 45, "male": true}`.
    ///
    /// `male` accepts booleans or numbers whose integer part is 0 or 1.
    /// Keys other than `age` and `male` are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            StagingError::InvalidMetadata(format!("expected a JSON object, got {value}"))
        })?;

        let age = match map.get("age") {
            None => None,
            Some(v) => Some(v.as_f64().ok_or_else(|| {
                StagingError::InvalidMetadata(format!("age must be a number, got {v}"))
            })?),
        };

        let male = match map.get("male") {
            None => None,
            Some(Value::Bool(b)) => Some(u8::from(*b)),
            Some(v) => {
                let x = v.as_f64().ok_or_else(|| {
                    StagingError::InvalidMetadata(format!("male must be 0 or 1, got {v}"))
                })?;
                let t = x.trunc();
                if t != 0.0 && t != 1.0 {
                    return Err(StagingError::InvalidMetadata(format!(
                        "male must be 0 or 1, got {v}"
                    )));
                }
                Some(t as u8)
            }
        };

        Self::new(age, male)
    }

    /// `true` when neither key is present.
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.male.is_none()
    }

    fn check(&self) -> Result<()> {
        if let Some(age) = self.age {
            if !(age > 0.0 && age < 120.0) {
                return Err(StagingError::InvalidMetadata(format!(
                    "age must be between 0 and 120, got {age}"
                )));
            }
        }
        if let Some(male) = self.male {
            if male > 1 {
                return Err(StagingError::InvalidMetadata(format!(
                    "male must be 0 or 1, got {male}"
                )));
            }
        }
        Ok(())
    }
}

/// A signal, rate and metadata triple that passed every check.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub signal: Array1<f64>,
    pub sfreq: f64,
    pub metadata: Option<Metadata>,
}

/// Reject non-finite rates and rates ≤ [`MIN_SFREQ`]; warn at ≥ [`HIGH_SFREQ`].
pub fn validate_sfreq(sfreq: f64) -> Result<f64> {
    if !sfreq.is_finite() || sfreq <= MIN_SFREQ {
        return Err(StagingError::InvalidRate(format!(
            "sampling frequency must be greater than {MIN_SFREQ} Hz, got {sfreq}"
        )));
    }
    if sfreq >= HIGH_SFREQ {
        warn!(
            "very high sampling frequency ({sfreq} Hz) increases computation time \
             without improving features; downsample to the 100-500 Hz range"
        );
    }
    Ok(sfreq)
}

/// Squeeze `signal` to one dimension and check its duration at `sfreq`.
///
/// Every axis of length 1 is dropped, so `[1, T]`, `[T, 1]` and `[T]` are
/// all accepted.  `sfreq` must already be valid.
pub fn validate_signal(signal: ArrayViewD<'_, f64>, sfreq: f64) -> Result<Array1<f64>> {
    let long_axes = signal.shape().iter().filter(|&&n| n > 1).count();
    if long_axes > 1 {
        return Err(StagingError::InvalidSignal(format!(
            "only single-channel data is supported, got shape {:?}",
            signal.shape()
        )));
    }
    if signal.is_empty() {
        return Err(StagingError::InvalidSignal("signal is empty".into()));
    }

    let flat: Array1<f64> = signal.iter().copied().collect();
    let minutes = flat.len() as f64 / sfreq / 60.0;
    if minutes < MIN_DURATION_MIN {
        return Err(StagingError::InvalidSignal(format!(
            "at least {MIN_DURATION_MIN} minutes of data is required, got {minutes:.2}"
        )));
    }
    Ok(flat)
}

/// Run every input check.  Pure apart from the high-rate log warning.
pub fn validate_input(
    signal: ArrayViewD<'_, f64>,
    sfreq: f64,
    metadata: Option<Metadata>,
) -> Result<ValidatedInput> {
    let sfreq = validate_sfreq(sfreq)?;
    let signal = validate_signal(signal, sfreq)?;
    if let Some(meta) = &metadata {
        meta.check()?;
    }
    Ok(ValidatedInput { signal, sfreq, metadata })
}
