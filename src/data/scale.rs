//! Column-wise feature scaling, applied in place. NaN cells are ignored when
//! computing column statistics and stay NaN.

use crate::math::matrix::Matrix;

/// Min-max scales every column to `[0, 1]`. A constant column becomes all
/// zeros.
pub fn normalize(data: &mut Matrix) {
    for j in 0..data.cols() {
        let (min, max) = observed(data, j).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let range = max - min;
        map_column(data, j, |v| if range > 0.0 { (v - min) / range } else { 0.0 });
    }
}

/// Z-score standardization: `(x - mean) / std` per column, with the
/// population standard deviation. A constant column becomes all zeros.
pub fn standardize(data: &mut Matrix) {
    for j in 0..data.cols() {
        let (sum, count) = observed(data, j).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;
        let var = observed(data, j).map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std = var.sqrt();
        map_column(data, j, |v| if std > 0.0 { (v - mean) / std } else { 0.0 });
    }
}

fn observed(data: &Matrix, col: usize) -> impl Iterator<Item = f64> + '_ {
    (0..data.rows()).map(move |i| data[(i, col)]).filter(|v| !v.is_nan())
}

fn map_column(data: &mut Matrix, col: usize, f: impl Fn(f64) -> f64) {
    for i in 0..data.rows() {
        let v = data[(i, col)];
        if !v.is_nan() {
            data[(i, col)] = f(v);
        }
    }
}
