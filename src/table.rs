//! Feature table assembly.
//!
//! Column layout, one row per epoch:
//!
//! ```text
//! time_hour, time_norm,
//! eeg_* (21 raw features),
//! eeg_*_rollavg_c5min_norm (centered rolling mean of every raw column),
//! eeg_*_norm (copy of every raw column),
//! [age], [male]
//! ```
//!
//! Every column ending in `_norm` except `time_norm` is then robust-scaled
//! (median / 5th–95th percentile range) over the whole table.
use std::ops::Range;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::config::{RollingEdges, StagingConfig};
use crate::epoch::Epochs;
use crate::error::{Result, StagingError};
use crate::features::raw_feature_names;
use crate::normalize::robust_scale_inplace;
use crate::validate::Metadata;

/// Suffix of the centered rolling-mean columns.
pub const ROLLING_SUFFIX: &str = "_rollavg_c5min_norm";
/// Suffix of the robust-normalised copies.
pub const NORM_SUFFIX: &str = "_norm";

/// Per-epoch feature table.
///
/// Cloning yields an independent copy; callers cannot reach the pipeline's
/// cached table through it.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f64>,
}

/// One epoch's row, borrowed from a [`FeatureTable`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    pub epoch: usize,
    columns: &'a [String],
    values: ArrayView1<'a, f64>,
}

impl<'a> FeatureRow<'a> {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.iter().position(|c| c == name).map(|i| self.values[i])
    }

    /// `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.columns.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

impl FeatureTable {
    /// Build a table from column names and an `[n_rows, n_cols]` matrix.
    ///
    /// Fails with [`StagingError::LengthMismatch`] if the name count does not
    /// match the matrix width.
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(StagingError::LengthMismatch {
                expected: values.ncols(),
                actual: columns.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Epoch indices, `0..n_rows`.
    pub fn epoch_index(&self) -> Range<usize> {
        0..self.n_rows()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.values.index_axis(Axis(1), i))
    }

    pub fn row(&self, epoch: usize) -> Option<FeatureRow<'_>> {
        (epoch < self.n_rows()).then(|| FeatureRow {
            epoch,
            columns: &self.columns,
            values: self.values.index_axis(Axis(0), epoch),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = FeatureRow<'_>> {
        self.values
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(epoch, values)| FeatureRow { epoch, columns: &self.columns, values })
    }

    /// Split into column names and the value matrix.
    pub fn into_parts(self) -> (Vec<String>, Array2<f64>) {
        (self.columns, self.values)
    }
}

/// Tables are equal when they have the same columns and every cell is equal
/// or both cells are `NaN`.
impl PartialEq for FeatureTable {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
            && self.values.dim() == other.values.dim()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// Centered rolling mean down the rows of `x`.
///
/// The window spans `window / 2` rows before and `window - 1 - window / 2`
/// rows after each row, shrunk near the table edges according to `edges`.
/// `NaN` cells are skipped; a window with no finite value yields `NaN`.
pub fn rolling_mean(x: &Array2<f64>, window: usize, edges: RollingEdges) -> Array2<f64> {
    let n = x.nrows();
    let before = window.max(1) / 2;
    let after = window.max(1) - 1 - before;

    let mut out = Array2::<f64>::zeros(x.dim());
    for i in 0..n {
        let (lo, hi) = match edges {
            RollingEdges::Truncate => (i.saturating_sub(before), (i + after).min(n - 1)),
            RollingEdges::Symmetric => {
                let room = i.min(n - 1 - i);
                (i - before.min(room), i + after.min(room))
            }
        };
        let win = x.slice(s![lo..=hi, ..]);
        for (c, col) in win.axis_iter(Axis(1)).enumerate() {
            let (sum, count) = col
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, k), &v| (s + v, k + 1));
            out[[i, c]] = if count == 0 { f64::NAN } else { sum / count as f64 };
        }
    }
    out
}

/// Merge epoch times, raw features and metadata into the final table.
///
/// `raw` is `[n_epochs, 21]` in [`raw_feature_names`] order.  Fails with
/// [`StagingError::NotFitted`] when there are no epochs.
pub fn assemble(
    epochs: &Epochs,
    raw: &Array2<f64>,
    metadata: Option<&Metadata>,
    cfg: &StagingConfig,
) -> Result<FeatureTable> {
    let n = epochs.n_epochs();
    if n == 0 || raw.nrows() == 0 {
        return Err(StagingError::NotFitted);
    }
    if raw.nrows() != n {
        return Err(StagingError::LengthMismatch { expected: n, actual: raw.nrows() });
    }

    let raw_names = raw_feature_names();
    let n_raw = raw.ncols();
    if raw_names.len() != n_raw {
        return Err(StagingError::LengthMismatch { expected: raw_names.len(), actual: n_raw });
    }

    let mut columns: Vec<String> = vec!["time_hour".into(), "time_norm".into()];
    columns.extend(raw_names.iter().map(|c| c.to_string()));
    columns.extend(raw_names.iter().map(|c| format!("{c}{ROLLING_SUFFIX}")));
    columns.extend(raw_names.iter().map(|c| format!("{c}{NORM_SUFFIX}")));

    let meta_cols: Vec<(&str, f64)> = metadata
        .map(|m| {
            let mut v = Vec::new();
            if let Some(age) = m.age {
                v.push(("age", age));
            }
            if let Some(male) = m.male {
                v.push(("male", f64::from(male)));
            }
            v
        })
        .unwrap_or_default();
    columns.extend(meta_cols.iter().map(|(c, _)| c.to_string()));

    let t_last = epochs.times[n - 1];
    let time_hour: Array1<f64> = epochs.times.mapv(|t| t / 3600.0);
    let time_norm: Array1<f64> = epochs.times.mapv(|t| t / t_last);
    let rolled = rolling_mean(raw, cfg.rolling_epochs, cfg.rolling_edges);

    let mut values = Array2::<f64>::zeros((n, columns.len()));
    values.column_mut(0).assign(&time_hour);
    values.column_mut(1).assign(&time_norm);
    let base = 2;
    values.slice_mut(s![.., base..base + n_raw]).assign(raw);
    values.slice_mut(s![.., base + n_raw..base + 2 * n_raw]).assign(&rolled);
    values.slice_mut(s![.., base + 2 * n_raw..base + 3 * n_raw]).assign(raw);
    for (k, (_, v)) in meta_cols.iter().enumerate() {
        values.column_mut(base + 3 * n_raw + k).fill(*v);
    }

    let norm_cols: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.ends_with(NORM_SUFFIX) && c.as_str() != "time_norm")
        .map(|(i, _)| i)
        .collect();
    robust_scale_inplace(&mut values, &norm_cols, cfg.quantile_range);

    log::debug!("feature table: {n} rows × {} columns", columns.len());
    FeatureTable::new(columns, values)
}
