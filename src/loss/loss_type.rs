use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NnError, Result};

/// Selects which loss function the training loop uses.
///
/// - `Mse`                    : mean-squared error; pair with Linear or Sigmoid output.
/// - `BinaryCrossEntropy`     : pair with a Sigmoid output.
/// - `CategoricalCrossEntropy`: pair with a Softmax output. Its gradient is
///   the combined Softmax+CE gradient, which only works because
///   `Activation::Softmax` reports a derivative of 1.0.
///
/// The discriminants are the integer codes used by the model file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse = 0,
    BinaryCrossEntropy = 1,
    CategoricalCrossEntropy = 2,
}

impl LossType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Result<LossType> {
        match code {
            0 => Ok(LossType::Mse),
            1 => Ok(LossType::BinaryCrossEntropy),
            2 => Ok(LossType::CategoricalCrossEntropy),
            other => Err(NnError::format(format!("unknown loss code {other}"))),
        }
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LossType::Mse => "MSE",
            LossType::BinaryCrossEntropy => "BinaryCE",
            LossType::CategoricalCrossEntropy => "CategoricalCE",
        })
    }
}
