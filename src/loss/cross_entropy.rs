use crate::loss::clip;
use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss averaged over samples:
    ///   L = -(1 / rows) · Σ y·ln(p)
    ///
    /// `y_pred`: softmax probabilities, one row per sample
    /// `y_true`: one-hot (or soft) targets of the same shape
    pub fn loss(y_true: &Matrix, y_pred: &Matrix) -> f64 {
        let samples = y_true.rows() as f64;
        let sum: f64 = y_true.as_slice().iter().zip(y_pred.as_slice())
            .map(|(y, p)| y * clip(*p).ln())
            .sum();
        -sum / samples
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the pre-softmax
    /// logits, averaged over the batch:
    ///   ∂L/∂z = (p - y) / rows
    ///
    /// The Softmax layer's own derivative is the constant 1.0, so this value
    /// passes through the output layer unchanged.
    pub fn gradient(y_true: &Matrix, y_pred: &Matrix) -> Matrix {
        let samples = y_true.rows() as f64;
        let mut grad = y_pred.clone();
        grad.as_mut_slice().iter_mut().zip(y_true.as_slice())
            .for_each(|(p, y)| *p = (clip(*p) - y) / samples);
        grad
    }
}
