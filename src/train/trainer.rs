use crate::error::{NnError, Result};
use crate::loss::{compute_loss, compute_loss_gradient};
use crate::math::matrix::Matrix;
use crate::network::network::SequentialModel;

/// One training step on a single batch: forward pass, loss, backward pass
/// through every layer, then one optimizer update per layer.
///
/// Returns the batch loss measured before the update. If the loss cannot
/// be computed (e.g. NaN predictions) the parameters are left unchanged.
pub fn train_step(model: &mut SequentialModel, x_batch: &Matrix, y_batch: &Matrix) -> Result<f64> {
    if !model.is_compiled() {
        return Err(NnError::NotCompiled);
    }
    let predictions = model.predict(x_batch)?;
    let loss = compute_loss(y_batch, &predictions, model.loss())?;
    let gradient = compute_loss_gradient(y_batch, &predictions, model.loss())?;
    model.backward(&gradient)?;
    model.update_weights()?;
    Ok(loss)
}
