//! Fixed-length epoching.
//!
//! Splits a continuous filtered signal into non-overlapping windows of
//! `epoch_seconds`, dropping any trailing incomplete window.  Epoch `e`
//! starts at sample `e · n_samples`, i.e. at `e · n_samples / sf` seconds.
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Epoched signal: start times plus an `[n_epochs, n_samples]` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Epochs {
    /// Start time of each epoch in seconds.
    pub times: Array1<f64>,
    /// One row per epoch.
    pub data: Array2<f64>,
}

impl Epochs {
    pub fn n_epochs(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Samples of epoch `e`.
    pub fn epoch(&self, e: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(0), e)
    }
}

/// Cut `x` into non-overlapping windows of `floor(window_sec · sf)` samples.
///
/// The number of epochs is `floor(len(x) / n_samples)`; a zero-length window
/// yields no epochs.
pub fn sliding_window(x: &[f64], sf: f64, window_sec: f64) -> Epochs {
    let n_samples = (window_sec * sf) as usize;
    if n_samples == 0 {
        return Epochs { times: Array1::zeros(0), data: Array2::zeros((0, 0)) };
    }
    let n_epochs = x.len() / n_samples;

    let data = Array2::from_shape_fn((n_epochs, n_samples), |(e, t)| x[e * n_samples + t]);
    let times = Array1::from_shape_fn(n_epochs, |e| (e * n_samples) as f64 / sf);
    Epochs { times, data }
}
