use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²) over every element.
    pub fn loss(y_true: &Matrix, y_pred: &Matrix) -> f64 {
        let n = y_true.len() as f64;
        y_true.as_slice().iter().zip(y_pred.as_slice())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>() / n
    }

    /// Per-element gradient: 2·(predicted - expected) / N, N = element count.
    pub fn gradient(y_true: &Matrix, y_pred: &Matrix) -> Matrix {
        let n = y_true.len() as f64;
        let mut grad = y_pred.clone();
        grad.as_mut_slice().iter_mut().zip(y_true.as_slice())
            .for_each(|(p, t)| *p = 2.0 * (*p - t) / n);
        grad
    }
}
