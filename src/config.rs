//! Pipeline configuration.
//!
//! [`StagingConfig`] holds every tunable parameter of the feature pipeline.
//! The defaults are the values the sleep-staging classifier was trained
//! with, except [`RollingEdges`]; changing any of them changes feature
//! semantics.

/// Edge policy of the centered rolling mean.
///
/// Only the first and last `window / 2` rows differ between the two.  The
/// historical classifier was trained on [`RollingEdges::Truncate`] inputs;
/// select it to reproduce them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollingEdges {
    /// Shrink the window symmetrically so it stays centered: row `i` uses
    /// half-width `min(half, i, n - 1 - i)`.  The first and last rows are
    /// averaged over themselves only.
    #[default]
    Symmetric,
    /// Clip the window to the table: row `i` averages rows
    /// `[i - half, i + half] ∩ [0, n)`, as
    /// `pandas.rolling(center=True, min_periods=1)` does.  Matches the
    /// inputs of the historical classifier.
    Truncate,
}

/// Configuration for the full feature pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use sleepstage::StagingConfig;
///
/// let cfg = StagingConfig {
///     window_seconds: 2.0,      // shorter Welch segments
///     broad_band: (1.0, 35.0),
///     ..StagingConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StagingConfig {
    /// Band-pass range applied before epoching, in Hz.  Also the range over
    /// which `eeg_abspow` is integrated.
    ///
    /// Default: `(0.5, 40.0)`.
    pub broad_band: (f64, f64),

    /// Length of the Welch segments in seconds.
    ///
    /// Should be at least `2 / broad_band.0` so the lowest frequency of
    /// interest is resolved (4 s for 0.5 Hz).  Clamped to the epoch length.
    ///
    /// Default: `4.0` s.
    pub window_seconds: f64,

    /// Duration of each epoch in seconds.
    ///
    /// Default: `30.0` s.
    pub epoch_seconds: f64,

    /// Number of epochs in the centered rolling mean (11 × 30 s = 5.5 min).
    ///
    /// Default: `11`.
    pub rolling_epochs: usize,

    /// Behavior of the rolling window near the first and last rows.
    ///
    /// Default: [`RollingEdges::Symmetric`].
    pub rolling_edges: RollingEdges,

    /// Lower and upper percentiles of the robust scaling range.
    ///
    /// Default: `(5.0, 95.0)`.
    pub quantile_range: (f64, f64),

    /// Permutation entropy embedding order.
    ///
    /// Default: `3`.
    pub perm_order: usize,

    /// Permutation entropy embedding delay, in samples.
    ///
    /// Default: `1`.
    pub perm_delay: usize,

    /// Largest interval `k` of the Higuchi curve-length estimate.
    ///
    /// Default: `10`.
    pub higuchi_kmax: usize,

    /// Divide each band power by the summed power of all six bands.
    ///
    /// Default: `false` (absolute power).
    pub relative_band_power: bool,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            broad_band: (0.5, 40.0),
            window_seconds: 4.0,
            epoch_seconds: 30.0,
            rolling_epochs: 11,
            rolling_edges: RollingEdges::Symmetric,
            quantile_range: (5.0, 95.0),
            perm_order: 3,
            perm_delay: 1,
            higuchi_kmax: 10,
            relative_band_power: false,
        }
    }
}

impl StagingConfig {
    /// Default configuration with the two `fit` arguments overridden.
    pub fn with_fit_args(broad_band: (f64, f64), window_seconds: f64) -> Self {
        Self { broad_band, window_seconds, ..Self::default() }
    }

    /// Samples per epoch, `floor(epoch_seconds × sf)`.
    ///
    /// ```
    /// use sleepstage::StagingConfig;
    /// assert_eq!(StagingConfig::default().epoch_samples(100.0), 3000);
    /// ```
    pub fn epoch_samples(&self, sf: f64) -> usize {
        (self.epoch_seconds * sf) as usize
    }

    /// Samples per Welch segment, `floor(window_seconds × sf)`.
    pub fn window_samples(&self, sf: f64) -> usize {
        (self.window_seconds * sf) as usize
    }
}
