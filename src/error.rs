//! Error type shared by every stage of the feature pipeline.
//!
//! Validation failures are caller configuration errors and are never
//! retried.  Numeric edge cases (zero-variance epochs, zero denominators)
//! are not errors: they surface as `NaN` cells in the feature table.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StagingError {
    #[error("invalid sampling rate: {0}")]
    InvalidRate(String),

    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid filter band [{low}, {high}] Hz at sfreq {sfreq} Hz")]
    InvalidFilterBand { low: f64, high: f64, sfreq: f64 },

    #[error("features have not been computed; call fit() first")]
    NotFitted,

    #[error("no predictions available; call predict() first")]
    NoPredictions,

    #[error("length mismatch: expected {expected} labels, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("classifier failed: {0}")]
    Classifier(String),
}

pub type Result<T> = std::result::Result<T, StagingError>;
