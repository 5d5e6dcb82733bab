use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NnError, Result};
use crate::math::functions::{relu, sigmoid, tanh};
use crate::math::matrix::Matrix;

/// Activation applied after a dense layer's linear transform.
///
/// The discriminants are the integer codes used by the model file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear = 0,
    Sigmoid = 1,
    #[serde(rename = "relu")]
    ReLU = 2,
    Tanh = 3,
    /// Row-wise softmax. Must be paired with
    /// [`LossType::CategoricalCrossEntropy`](crate::loss::LossType); see
    /// [`Activation::derivative`].
    Softmax = 4,
}

impl Activation {
    /// Element-wise activation. `Softmax` is row-wise and handled in
    /// [`Activation::apply`]; calling this on it returns `x` unchanged.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Linear | Activation::Softmax => x,
            Activation::Sigmoid => sigmoid(x),
            Activation::ReLU => relu(x),
            Activation::Tanh => tanh(x),
        }
    }

    /// Element-wise derivative evaluated at the pre-activation `z`.
    ///
    /// For `Softmax` this is the constant `1.0`. Categorical cross-entropy
    /// already returns the combined softmax + cross-entropy gradient
    /// `(p - y) / batch_size`, so the Jacobian must not be applied a second
    /// time. Softmax followed by any other loss yields a wrong gradient.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Linear | Activation::Softmax => 1.0,
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            Activation::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    /// Applies the activation to every row of `z`.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            Activation::Softmax => softmax_rows(z),
            _ => z.map(|x| self.function(x)),
        }
    }

    pub fn apply_derivative(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.derivative(x))
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Result<Activation> {
        match code {
            0 => Ok(Activation::Linear),
            1 => Ok(Activation::Sigmoid),
            2 => Ok(Activation::ReLU),
            3 => Ok(Activation::Tanh),
            4 => Ok(Activation::Softmax),
            other => Err(NnError::format(format!("unknown activation code {other}"))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Linear => "Linear",
            Activation::Sigmoid => "Sigmoid",
            Activation::ReLU => "ReLU",
            Activation::Tanh => "Tanh",
            Activation::Softmax => "Softmax",
        };
        f.write_str(name)
    }
}

/// Numerically stable softmax: the row max is subtracted before
/// exponentiating, then each row is divided by its sum.
fn softmax_rows(z: &Matrix) -> Matrix {
    let mut out = z.clone();
    for i in 0..out.rows() {
        let row = out.row_mut(i);
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for x in row.iter_mut() {
            *x = (*x - max).exp();
            sum += *x;
        }
        row.iter_mut().for_each(|x| *x /= sum);
    }
    out
}
