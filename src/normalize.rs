//! Percentiles and robust scaling.
//!
//! `percentile_sorted`: linear interpolation between closest ranks,
//!   matching `numpy.percentile(..., interpolation='linear')`.
//!
//! `robust_scale_inplace`: matches `sklearn.preprocessing.robust_scale`:
//!   for each column: x = (x − median) / (q_hi − q_lo)
//!   NaN cells are ignored for the statistics and kept in the output.
use ndarray::{ArrayViewMut1, Axis, Array2};

/// `q`-th percentile (0–100) of an ascending, NaN-free slice.
///
/// Returns `NaN` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let pos = q / 100.0 * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Non-NaN values of `x` in ascending order.
pub fn sorted_non_nan<'a>(x: impl IntoIterator<Item = &'a f64>) -> Vec<f64> {
    let mut v: Vec<f64> = x.into_iter().copied().filter(|v| !v.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Center and scale of a robust scaler fitted on one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustParams {
    pub center: f64,
    pub scale: f64,
}

/// Median and inter-percentile range of `column`, ignoring NaN.
///
/// A scale below `10 · f64::EPSILON` (constant column) is replaced by 1 so
/// the column is only centered.
pub fn robust_params<'a>(
    column: impl IntoIterator<Item = &'a f64>,
    quantile_range: (f64, f64),
) -> RobustParams {
    let sorted = sorted_non_nan(column);
    let center = percentile_sorted(&sorted, 50.0);
    let mut scale = percentile_sorted(&sorted, quantile_range.1)
        - percentile_sorted(&sorted, quantile_range.0);
    if scale.abs() < 10.0 * f64::EPSILON {
        scale = 1.0;
    }
    RobustParams { center, scale }
}

/// Robust-scale one column in place.  Returns the parameters used.
pub fn robust_scale_column(mut column: ArrayViewMut1<'_, f64>, quantile_range: (f64, f64)) -> RobustParams {
    let p = robust_params(column.iter(), quantile_range);
    column.mapv_inplace(|v| (v - p.center) / p.scale);
    p
}

/// Robust-scale the selected columns of `table` in place, each over all rows.
pub fn robust_scale_inplace(table: &mut Array2<f64>, columns: &[usize], quantile_range: (f64, f64)) {
    for &c in columns {
        robust_scale_column(table.index_axis_mut(Axis(1), c), quantile_range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn percentile_matches_numpy_linear() {
        let x = [1.0, 2.0, 3.0, 4.0, 10.0];
        approx::assert_abs_diff_eq!(percentile_sorted(&x, 50.0), 3.0);
        approx::assert_abs_diff_eq!(percentile_sorted(&x, 10.0), 1.4, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(percentile_sorted(&x, 90.0), 7.6, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(percentile_sorted(&x, 100.0), 10.0);
        assert!(percentile_sorted(&[], 50.0).is_nan());
    }

    #[test]
    fn robust_scale_uses_5_95_range() {
        let mut col: Array1<f64> = (0..101).map(|i| i as f64).collect();
        let p = robust_scale_column(col.view_mut(), (5.0, 95.0));
        approx::assert_abs_diff_eq!(p.center, 50.0);
        approx::assert_abs_diff_eq!(p.scale, 90.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(col[50], 0.0);
        approx::assert_abs_diff_eq!(col[95], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn constant_column_only_centered() {
        let mut col = array![3.0, 3.0, 3.0];
        let p = robust_scale_column(col.view_mut(), (5.0, 95.0));
        assert_eq!(p.scale, 1.0);
        assert!(col.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn nan_ignored_and_preserved() {
        let mut col = array![f64::NAN, 1.0, 2.0, 3.0];
        robust_scale_column(col.view_mut(), (0.0, 100.0));
        assert!(col[0].is_nan());
        approx::assert_abs_diff_eq!(col[1], -0.5);
        approx::assert_abs_diff_eq!(col[3], 0.5);
    }

    #[test]
    fn only_selected_columns_scaled() {
        let mut t = Array2::from_shape_fn((5, 2), |(r, _)| r as f64);
        robust_scale_inplace(&mut t, &[1], (0.0, 100.0));
        assert_eq!(t[[4, 0]], 4.0);
        approx::assert_abs_diff_eq!(t[[4, 1]], 0.5);
    }
}
