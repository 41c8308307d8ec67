//! # sleepstage: sleep-staging features from single-channel EEG
//!
//! `sleepstage` turns one continuous EEG derivation (preferably C4-M1 or
//! C3-M2) into a table of per-30-second-epoch features for a downstream
//! sleep-stage classifier.  Every numeric choice (filter design, Welch
//! settings, band edges, rolling span, scaling quantiles) is fixed by
//! [`StagingConfig::default()`] so that a trained classifier stays valid.
//!
//! ## Pipeline overview
//!
//! ```text
//! signal [T] f64, sfreq, metadata
//!   │
//!   ├─ validate               rate > 80 Hz, ≥ 5 min, 1-D, age/male checks
//!   ├─ filter (FIR BP)        zero-phase Hamming FIR, 0.5–40 Hz
//!   ├─ epoch                  non-overlapping 30 s windows
//!   ├─ features
//!   │    ├─ time_domain       absmean, std, 10p, 90p, iqr, skew, kurt
//!   │    ├─ spectral          Welch (median) → 6 bands, 4 ratios, abspow
//!   │    └─ complexity        perm entropy, Higuchi FD, zero crossings
//!   └─ table
//!        ├─ time_hour, time_norm
//!        ├─ *_rollavg_c5min_norm   centered 11-epoch rolling mean
//!        ├─ *_norm                 robust scaling (median, 5–95 %)
//!        └─ age, male              constant metadata columns
//!             │
//!             └─→ FeatureTable [n_epochs, n_features]
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use sleepstage::{Metadata, SleepStaging};
//! use ndarray::Array1;
//!
//! let eeg: Array1<f64> = Array1::zeros(256 * 3600);  // 1 h at 256 Hz
//! let meta = Metadata::new(Some(45.0), Some(1)).unwrap();
//!
//! let mut sls = SleepStaging::new(eeg.view(), 256.0, Some(meta)).unwrap();
//! let features = sls.get_features(None).unwrap();
//! println!("{} epochs × {} features", features.n_rows(), features.n_cols());
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use sleepstage::filter::bandpass;
//! use sleepstage::epoch::sliding_window;
//! use sleepstage::features::extract_raw_features;
//! use sleepstage::table::assemble;
//! use sleepstage::StagingConfig;
//!
//! let x = vec![0.0_f64; 100 * 600];
//! let cfg = StagingConfig::default();
//!
//! let filtered = bandpass(&x, 100.0, 0.5, 40.0).unwrap();
//! let epochs = sliding_window(&filtered, 100.0, cfg.epoch_seconds);  // [20, 3000]
//! let raw = extract_raw_features(&epochs, 100.0, &cfg);               // [20, 21]
//! let table = assemble(&epochs, &raw, None, &cfg).unwrap();
//! ```

pub mod config;
pub mod epoch;
pub mod error;
pub mod features;
pub mod filter;
pub mod io;
pub mod normalize;
pub mod staging;
pub mod table;
pub mod validate;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{RollingEdges, StagingConfig};
pub use epoch::{sliding_window, Epochs};
pub use error::{Result, StagingError};
pub use features::{extract_raw_features, raw_feature_names, BANDS};
pub use filter::{bandpass, design_bandpass, filter_zero_phase};
pub use io::{write_features, write_features_csv, RawSignal, StWriter};
pub use normalize::{percentile_sorted, robust_scale_inplace};
pub use staging::{Accuracy, Classifier, Metric, SleepStaging};
pub use table::{assemble, rolling_mean, FeatureRow, FeatureTable};
pub use validate::{validate_input, Metadata, ValidatedInput};
