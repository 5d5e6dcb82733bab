use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{NnError, Result};

/// Dense row-major matrix backed by one contiguous buffer.
///
/// Every constructor validates `rows > 0 && cols > 0`; element `(i, j)` lives
/// at `data[i * cols + j]`. Cloning is a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<MatrixRepr> for Matrix {
    type Error = NnError;

    fn try_from(repr: MatrixRepr) -> Result<Matrix> {
        Matrix::from_vec(repr.rows, repr.cols, repr.data)
    }
}

impl Matrix {
    /// Zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 1.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(NnError::dims(format!(
                "matrix dimensions must be positive, got {rows}x{cols}"
            )));
        }
        let len = rows.checked_mul(cols).ok_or_else(|| {
            NnError::AllocationFailure(format!("{rows}x{cols} overflows the element count"))
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            NnError::AllocationFailure(format!("cannot allocate {rows}x{cols} matrix: {e}"))
        })?;
        data.resize(len, value);
        Ok(Matrix { rows, cols, data })
    }

    /// Wraps a row-major buffer. `data.len()` must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(NnError::dims(format!(
                "matrix dimensions must be positive, got {rows}x{cols}"
            )));
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(NnError::dims(format!(
                "buffer of {} values cannot form a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(NnError::dims(format!(
                "row {i} has {} values, expected {n_cols}",
                row.len()
            )));
        }
        Matrix::from_vec(n_rows, n_cols, rows.into_iter().flatten().collect())
    }

    /// Uniform samples in `[0, 1)` drawn from `rng`.
    pub fn random_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let mut res = Matrix::zeros(rows, cols)?;
        res.data.iter_mut().for_each(|x| *x = rng.gen::<f64>());
        Ok(res)
    }

    /// Xavier (Glorot) uniform initialization: samples from `[-s, s]` with
    /// `s = sqrt(2 / (fan_in + fan_out))`.
    ///
    /// Shape: (rows, cols) where `cols` is the fan-in and `rows` the fan-out,
    /// matching the `out × in` weight layout of a dense layer.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let mut res = Matrix::zeros(rows, cols)?;
        let scale = (2.0 / (rows as f64 + cols as f64)).sqrt();
        res.data
            .iter_mut()
            .for_each(|x| *x = (rng.gen::<f64>() - 0.5) * 2.0 * scale);
        Ok(res)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`; a matrix holds at least one element.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let cols = self.cols;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// Copies row `row` into a new `1 × cols` matrix.
    pub fn get_row(&self, row: usize) -> Result<Matrix> {
        self.check_row(row)?;
        Matrix::from_vec(1, self.cols, self.row(row).to_vec())
    }

    /// Copies column `col` into a new `rows × 1` matrix.
    pub fn get_col(&self, col: usize) -> Result<Matrix> {
        self.check_col(col)?;
        let data = (0..self.rows).map(|i| self.data[i * self.cols + col]).collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Overwrites row `row` with a `1 × cols` matrix.
    pub fn set_row(&mut self, row: usize, values: &Matrix) -> Result<()> {
        self.check_row(row)?;
        if values.shape() != (1, self.cols) {
            return Err(NnError::dims(format!(
                "row data is {}x{}, expected 1x{}",
                values.rows, values.cols, self.cols
            )));
        }
        self.row_mut(row).copy_from_slice(&values.data);
        Ok(())
    }

    /// Overwrites column `col` with a `rows × 1` matrix.
    pub fn set_col(&mut self, col: usize, values: &Matrix) -> Result<()> {
        self.check_col(col)?;
        if values.shape() != (self.rows, 1) {
            return Err(NnError::dims(format!(
                "column data is {}x{}, expected {}x1",
                values.rows, values.cols, self.rows
            )));
        }
        for (i, v) in values.data.iter().enumerate() {
            self.data[i * self.cols + col] = *v;
        }
        Ok(())
    }

    /// Rows `start..end` as a new matrix.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Matrix> {
        if start >= end || end > self.rows {
            return Err(NnError::dims(format!(
                "row range {start}..{end} is invalid for {} rows",
                self.rows
            )));
        }
        Matrix::from_vec(
            end - start,
            self.cols,
            self.data[start * self.cols..end * self.cols].to_vec(),
        )
    }

    /// Gathers the listed rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            self.check_row(i)?;
            data.extend_from_slice(self.row(i));
        }
        Matrix::from_vec(indices.len(), self.cols, data)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "multiply", |a, b| a * b)
    }

    /// Standard matrix product `self · other`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(NnError::dims(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut res = Matrix::zeros(self.rows, other.cols)?;
        // i-k-j order keeps both inner accesses contiguous; the per-element
        // summation order over k is unchanged.
        for i in 0..self.rows {
            let out = &mut res.data[i * other.cols..(i + 1) * other.cols];
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                let b_row = &other.data[k * other.cols..(k + 1) * other.cols];
                for (o, b) in out.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Ok(res)
    }

    /// `self · otherᵗ` without materializing the transpose.
    pub fn matmul_transposed(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.cols {
            return Err(NnError::dims(format!(
                "cannot multiply {}x{} by transpose of {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut res = Matrix::zeros(self.rows, other.rows)?;
        for i in 0..self.rows {
            let a_row = self.row(i);
            for j in 0..other.rows {
                res.data[i * other.rows + j] =
                    a_row.iter().zip(other.row(j)).map(|(a, b)| a * b).sum();
            }
        }
        Ok(res)
    }

    /// `selfᵗ · other` without materializing the transpose.
    pub fn transpose_matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.rows != other.rows {
            return Err(NnError::dims(format!(
                "cannot multiply transpose of {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut res = Matrix::zeros(self.cols, other.cols)?;
        for k in 0..self.rows {
            let b_row = other.row(k);
            for i in 0..self.cols {
                let a = self.data[k * self.cols + i];
                let out = &mut res.data[i * other.cols..(i + 1) * other.cols];
                for (o, b) in out.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix { rows: self.cols, cols: self.rows, data }
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }

    /// Applies `functor` to every element, returning a new matrix.
    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn add_inplace(&mut self, other: &Matrix) -> Result<()> {
        self.zip_inplace(other, "add", |a, b| *a += b)
    }

    pub fn subtract_inplace(&mut self, other: &Matrix) -> Result<()> {
        self.zip_inplace(other, "subtract", |a, b| *a -= b)
    }

    pub fn scale_inplace(&mut self, scalar: f64) {
        self.data.iter_mut().for_each(|x| *x *= scalar);
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|x| x.is_nan())
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Averages over rows, returning a `cols × 1` column vector.
    pub fn mean_over_rows(&self) -> Matrix {
        let mut data = vec![0.0; self.cols];
        for i in 0..self.rows {
            for (acc, x) in data.iter_mut().zip(self.row(i)) {
                *acc += x;
            }
        }
        let n = self.rows as f64;
        data.iter_mut().for_each(|x| *x /= n);
        Matrix { rows: self.cols, cols: 1, data }
    }

    /// Column index of the largest value in row `row`.
    pub fn argmax_row(&self, row: usize) -> usize {
        self.row(row)
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn same_shape(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::dims(format!(
                "cannot {op} {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    fn zip_with<F>(&self, other: &Matrix, op: &str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.same_shape(other, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
        })
    }

    fn zip_inplace<F>(&mut self, other: &Matrix, op: &str, f: F) -> Result<()>
    where
        F: Fn(&mut f64, f64),
    {
        self.same_shape(other, op)?;
        self.data.iter_mut().zip(&other.data).for_each(|(a, &b)| f(a, b));
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows {
            return Err(NnError::dims(format!(
                "row index {row} out of bounds for {} rows",
                self.rows
            )));
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.cols {
            return Err(NnError::dims(format!(
                "column index {col} out of bounds for {} columns",
                self.cols
            )));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        &mut self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{}:", self.rows, self.cols)?;
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|x| format!("{x:8.4}")).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rng::seeded_rng;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn zero_sized_matrix_is_rejected() {
        assert!(matches!(Matrix::zeros(0, 3), Err(NnError::InvalidDimension(_))));
        assert!(matches!(Matrix::zeros(3, 0), Err(NnError::InvalidDimension(_))));
    }

    #[test]
    fn overflowing_shape_is_an_allocation_failure() {
        assert!(matches!(
            Matrix::zeros(usize::MAX, 2),
            Err(NnError::AllocationFailure(_))
        ));
    }

    #[test]
    fn oversized_xavier_is_an_error_not_a_panic() {
        let mut rng = seeded_rng(0);
        assert!(matches!(
            Matrix::xavier(usize::MAX, 2, &mut rng),
            Err(NnError::AllocationFailure(_))
        ));
        assert!(matches!(
            Matrix::xavier(2, usize::MAX, &mut rng),
            Err(NnError::AllocationFailure(_))
        ));
    }

    #[test]
    fn checked_get_and_sum() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.5]]);
        assert_eq!(a.get(1, 1), Some(4.5));
        assert_eq!(a.get(2, 0), None);
        assert_eq!(a.get(0, 2), None);
        assert_eq!(a.sum(), 10.5);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(res, Err(NnError::InvalidDimension(_))));
    }

    #[test]
    fn matmul_variants_agree() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let direct = a.matmul(&b).unwrap();
        assert_eq!(direct, m(vec![vec![58.0, 64.0], vec![139.0, 154.0]]));
        assert_eq!(a.matmul_transposed(&b.transpose()).unwrap(), direct);
        assert_eq!(a.transpose().transpose_matmul(&b).unwrap(), direct);
    }

    #[test]
    fn matmul_rejects_mismatched_inner_dimension() {
        let a = Matrix::zeros(2, 3).unwrap();
        assert!(a.matmul(&a).is_err());
    }

    #[test]
    fn inplace_ops_mutate_left_operand() {
        let mut a = m(vec![vec![1.0, 2.0]]);
        a.add_inplace(&m(vec![vec![1.0, 1.0]])).unwrap();
        a.scale_inplace(2.0);
        a.subtract_inplace(&m(vec![vec![0.5, 0.5]])).unwrap();
        assert_eq!(a.as_slice(), &[3.5, 5.5]);
        assert!(a.add_inplace(&Matrix::zeros(2, 2).unwrap()).is_err());
    }

    #[test]
    fn mean_over_rows_is_a_column() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 6.0]]);
        let mean = a.mean_over_rows();
        assert_eq!(mean.shape(), (2, 1));
        assert_eq!(mean.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn has_nan_detects_nan_only() {
        let mut a = m(vec![vec![f64::INFINITY, 1.0]]);
        assert!(!a.has_nan());
        a[(0, 1)] = f64::NAN;
        assert!(a.has_nan());
    }

    #[test]
    fn row_and_column_access() {
        let mut a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(a.get_row(1).unwrap().as_slice(), &[3.0, 4.0]);
        assert_eq!(a.get_col(1).unwrap().as_slice(), &[2.0, 4.0, 6.0]);
        a.set_col(0, &m(vec![vec![0.0], vec![0.0], vec![0.0]])).unwrap();
        a.set_row(2, &m(vec![vec![9.0, 9.0]])).unwrap();
        assert_eq!(a.as_slice(), &[0.0, 2.0, 0.0, 4.0, 9.0, 9.0]);
        assert_eq!(a.slice_rows(1, 3).unwrap().as_slice(), &[0.0, 4.0, 9.0, 9.0]);
        assert_eq!(a.select_rows(&[2, 0]).unwrap().as_slice(), &[9.0, 9.0, 0.0, 2.0]);
        assert!(a.get_row(3).is_err());
        assert!(a.slice_rows(2, 2).is_err());
    }

    #[test]
    fn deserialization_validates_shape() {
        let bad = r#"{"rows":2,"cols":2,"data":[1.0,2.0,3.0]}"#;
        assert!(serde_json::from_str::<Matrix>(bad).is_err());
        let good = r#"{"rows":1,"cols":2,"data":[1.0,2.0]}"#;
        let parsed: Matrix = serde_json::from_str(good).unwrap();
        assert_eq!(parsed.shape(), (1, 2));
    }
}
