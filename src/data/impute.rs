use log::debug;

use crate::math::matrix::Matrix;

/// Number of NaN cells.
pub fn count_missing(data: &Matrix) -> usize {
    data.as_slice().iter().filter(|v| v.is_nan()).count()
}

/// Replaces NaN cells with the mean of the non-missing values in the same
/// column. A column with no observed values is filled with zero.
pub fn fill_missing_with_mean(data: &mut Matrix) {
    let (rows, cols) = data.shape();
    for j in 0..cols {
        let (sum, count) = (0..rows)
            .map(|i| data[(i, j)])
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        if count < rows {
            debug!("column {j}: imputing {} missing values with {mean}", rows - count);
        }
        for i in 0..rows {
            if data[(i, j)].is_nan() {
                data[(i, j)] = mean;
            }
        }
    }
}

pub fn fill_missing_with_zeros(data: &mut Matrix) {
    for v in data.as_mut_slice().iter_mut().filter(|v| v.is_nan()) {
        *v = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![
            vec![1.0, f64::NAN, f64::NAN],
            vec![3.0, 4.0, f64::NAN],
            vec![f64::NAN, 6.0, f64::NAN],
        ])
        .unwrap()
    }

    #[test]
    fn mean_imputation_per_column() {
        let mut m = sample();
        assert_eq!(count_missing(&m), 5);
        fill_missing_with_mean(&mut m);
        assert_eq!(count_missing(&m), 0);
        assert_eq!(m[(2, 0)], 2.0);
        assert_eq!(m[(0, 1)], 5.0);
        // Entirely missing column falls back to zero.
        assert_eq!(m.get_col(2).unwrap().as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_imputation() {
        let mut m = sample();
        fill_missing_with_zeros(&mut m);
        assert_eq!(m.row(0), &[1.0, 0.0, 0.0]);
    }
}
