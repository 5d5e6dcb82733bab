use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Result of [`train_test_split`]. The index vectors record which original
/// rows landed in each part.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Matrix,
    pub x_test: Matrix,
    pub y_train: Matrix,
    pub y_test: Matrix,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Returns a new matrix with the rows of `data` in a random order.
pub fn shuffle_rows<R: Rng + ?Sized>(data: &Matrix, rng: &mut R) -> Result<Matrix> {
    let mut indices: Vec<usize> = (0..data.rows()).collect();
    indices.shuffle(rng);
    data.select_rows(&indices)
}

/// Shuffles `x` and `y` with one shared row permutation, so sample `i` of
/// the result pairs the same features and targets as before.
pub fn shuffle_dataset<R: Rng + ?Sized>(
    x: &Matrix,
    y: &Matrix,
    rng: &mut R,
) -> Result<(Matrix, Matrix)> {
    check_aligned(x, y)?;
    let mut indices: Vec<usize> = (0..x.rows()).collect();
    indices.shuffle(rng);
    Ok((x.select_rows(&indices)?, y.select_rows(&indices)?))
}

/// Shuffles the sample indices and puts `floor(n * test_size)` rows in the
/// test part. Both parts must end up non-empty.
pub fn train_test_split<R: Rng + ?Sized>(
    x: &Matrix,
    y: &Matrix,
    test_size: f64,
    rng: &mut R,
) -> Result<TrainTestSplit> {
    check_aligned(x, y)?;
    if test_size.is_nan() || test_size <= 0.0 || test_size >= 1.0 {
        return Err(NnError::InvalidConfig(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let n = x.rows();
    let n_test = (n as f64 * test_size).floor() as usize;
    if n_test == 0 || n_test >= n {
        return Err(NnError::InvalidConfig(format!(
            "test_size {test_size} leaves an empty part for {n} samples"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();
    debug!("split {n} samples into {} train / {n_test} test", train_indices.len());

    Ok(TrainTestSplit {
        x_train: x.select_rows(&train_indices)?,
        x_test: x.select_rows(&test_indices)?,
        y_train: y.select_rows(&train_indices)?,
        y_test: y.select_rows(&test_indices)?,
        train_indices,
        test_indices,
    })
}

fn check_aligned(x: &Matrix, y: &Matrix) -> Result<()> {
    if x.rows() != y.rows() {
        return Err(NnError::dims(format!(
            "X has {} rows but y has {}",
            x.rows(),
            y.rows()
        )));
    }
    Ok(())
}
