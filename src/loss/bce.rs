use crate::loss::clip;
use crate::math::matrix::Matrix;

pub struct BceLoss;

impl BceLoss {
    /// Scalar BCE: -mean(y·ln(p) + (1-y)·ln(1-p)), p clipped to [ε, 1-ε].
    pub fn loss(y_true: &Matrix, y_pred: &Matrix) -> f64 {
        let n = y_true.len() as f64;
        let sum: f64 = y_true.as_slice().iter().zip(y_pred.as_slice())
            .map(|(y, p)| {
                let p = clip(*p);
                y * p.ln() + (1.0 - y) * (1.0 - p).ln()
            })
            .sum();
        -sum / n
    }

    /// Per-element gradient: (p - y) / (p·(1-p)·N).
    pub fn gradient(y_true: &Matrix, y_pred: &Matrix) -> Matrix {
        let n = y_true.len() as f64;
        let mut grad = y_pred.clone();
        grad.as_mut_slice().iter_mut().zip(y_true.as_slice())
            .for_each(|(p, y)| {
                let c = clip(*p);
                *p = (c - y) / (c * (1.0 - c)) / n;
            });
        grad
    }
}
