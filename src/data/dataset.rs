use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Every column except `label_col`, in order.
pub fn features_without_column(data: &Matrix, label_col: usize) -> Result<Matrix> {
    check_column(data, label_col)?;
    if data.cols() < 2 {
        return Err(NnError::dims("dataset has no feature columns besides the label"));
    }
    let mut values = Vec::with_capacity(data.rows() * (data.cols() - 1));
    for i in 0..data.rows() {
        values.extend(
            data.row(i)
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != label_col)
                .map(|(_, v)| *v),
        );
    }
    Matrix::from_vec(data.rows(), data.cols() - 1, values)
}

/// Column `label_col` as a `rows × 1` matrix.
pub fn label_column(data: &Matrix, label_col: usize) -> Result<Matrix> {
    check_column(data, label_col)?;
    data.get_col(label_col)
}

/// One-hot encodes a single column of integer class indices into
/// `rows × num_classes`.
pub fn one_hot(labels: &Matrix, num_classes: usize) -> Result<Matrix> {
    if labels.cols() != 1 {
        return Err(NnError::dims(format!(
            "labels must be a single column, got {} columns",
            labels.cols()
        )));
    }
    let mut out = Matrix::zeros(labels.rows(), num_classes)?;
    for i in 0..labels.rows() {
        let v = labels[(i, 0)];
        if v < 0.0 || v.fract() != 0.0 || v as usize >= num_classes {
            return Err(NnError::InvalidConfig(format!(
                "row {i}: label {v} is not a class index below {num_classes}"
            )));
        }
        out[(i, v as usize)] = 1.0;
    }
    Ok(out)
}

/// The XOR truth table: 4 samples, 2 inputs, 1 binary target.
pub fn xor() -> Result<(Matrix, Matrix)> {
    let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0])?;
    let y = Matrix::from_vec(4, 1, vec![0.0, 1.0, 1.0, 0.0])?;
    Ok((x, y))
}

fn check_column(data: &Matrix, col: usize) -> Result<()> {
    if col >= data.cols() {
        return Err(NnError::dims(format!(
            "label column {col} out of bounds for {} columns",
            data.cols()
        )));
    }
    Ok(())
}
