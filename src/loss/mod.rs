pub mod bce;
pub mod cross_entropy;
pub mod loss_type;
pub mod mse;

pub use bce::BceLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use loss_type::LossType;
pub use mse::MseLoss;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Predictions are clipped to `[EPSILON, 1 - EPSILON]` before any logarithm.
pub const EPSILON: f64 = 1e-7;

pub(crate) fn clip(p: f64) -> f64 {
    p.clamp(EPSILON, 1.0 - EPSILON)
}

/// Scalar loss for a batch, dispatched on `LossType`.
pub fn compute_loss(y_true: &Matrix, y_pred: &Matrix, loss: LossType) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    Ok(match loss {
        LossType::Mse => MseLoss::loss(y_true, y_pred),
        LossType::BinaryCrossEntropy => BceLoss::loss(y_true, y_pred),
        LossType::CategoricalCrossEntropy => CrossEntropyLoss::loss(y_true, y_pred),
    })
}

/// Gradient of the loss w.r.t. `y_pred`, same shape as the inputs.
pub fn compute_loss_gradient(y_true: &Matrix, y_pred: &Matrix, loss: LossType) -> Result<Matrix> {
    check_inputs(y_true, y_pred)?;
    Ok(match loss {
        LossType::Mse => MseLoss::gradient(y_true, y_pred),
        LossType::BinaryCrossEntropy => BceLoss::gradient(y_true, y_pred),
        LossType::CategoricalCrossEntropy => CrossEntropyLoss::gradient(y_true, y_pred),
    })
}

fn check_inputs(y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
    if y_true.shape() != y_pred.shape() {
        return Err(NnError::dims(format!(
            "targets are {}x{} but predictions are {}x{}",
            y_true.rows(), y_true.cols(), y_pred.rows(), y_pred.cols()
        )));
    }
    if y_true.has_nan() {
        return Err(NnError::NumericalInstability("NaN detected in true labels".into()));
    }
    if y_pred.has_nan() {
        return Err(NnError::NumericalInstability("NaN detected in predictions".into()));
    }
    Ok(())
}
