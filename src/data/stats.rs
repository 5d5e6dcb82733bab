use std::collections::BTreeMap;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Summary of one column, ignoring NaN cells. `mean`, `min` and `max` are NaN
/// when the column has no observed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub fn column_stats(data: &Matrix, col: usize) -> Result<ColumnStats> {
    if col >= data.cols() {
        return Err(NnError::dims(format!(
            "column {col} out of bounds for {} columns",
            data.cols()
        )));
    }
    let mut stats = ColumnStats {
        count: 0,
        missing: 0,
        mean: f64::NAN,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };
    let mut sum = 0.0;
    for i in 0..data.rows() {
        let v = data[(i, col)];
        if v.is_nan() {
            stats.missing += 1;
            continue;
        }
        stats.count += 1;
        sum += v;
        stats.min = stats.min.min(v);
        stats.max = stats.max.max(v);
    }
    if stats.count == 0 {
        stats.min = f64::NAN;
        stats.max = f64::NAN;
    } else {
        stats.mean = sum / stats.count as f64;
    }
    Ok(stats)
}

/// Per-class sample counts for a label column. Classes are the integer part
/// of each label; NaN labels are skipped.
pub fn class_distribution(labels: &Matrix, col: usize) -> Result<BTreeMap<i64, usize>> {
    if col >= labels.cols() {
        return Err(NnError::dims(format!(
            "column {col} out of bounds for {} columns",
            labels.cols()
        )));
    }
    let mut counts = BTreeMap::new();
    for i in 0..labels.rows() {
        let v = labels[(i, col)];
        if !v.is_nan() {
            *counts.entry(v as i64).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stats_skip_missing_values() {
        let m = Matrix::from_vec(4, 1, vec![1.0, f64::NAN, 5.0, 3.0]).unwrap();
        let s = column_stats(&m, 0).unwrap();
        assert_eq!((s.count, s.missing), (3, 1));
        assert_relative_eq!(s.mean, 3.0);
        assert_eq!((s.min, s.max), (1.0, 5.0));
        assert!(column_stats(&m, 1).is_err());
    }

    #[test]
    fn counts_classes() {
        let m = Matrix::from_vec(5, 1, vec![0.0, 1.0, 1.0, 2.0, 1.0]).unwrap();
        let dist = class_distribution(&m, 0).unwrap();
        assert_eq!(dist.get(&1), Some(&3));
        assert_eq!(dist.len(), 3);
    }
}
