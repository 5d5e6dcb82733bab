use rand::Rng;

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

pub const DEFAULT_LAYER_NAME: &str = "dense";

/// Matrices remembered from the most recent forward pass.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub input: Matrix,
    /// Pre-activation values `z = input · Wᵗ + b`, needed for the derivative.
    pub z: Matrix,
    pub output: Matrix,
}

/// Fully-connected layer: `output = activation(input · Wᵗ + b)`.
///
/// Weights are stored `output_size × input_size`, biases `output_size × 1`.
/// Shapes are fixed at construction.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    input_size: usize,
    output_size: usize,
    activation: Activation,
    pub(crate) weights: Matrix,
    pub(crate) biases: Matrix,
    pub(crate) weight_grads: Matrix,
    pub(crate) bias_grads: Matrix,
    cache: Option<ForwardCache>,
}

impl Layer {
    /// Creates a dense layer of `units` neurons fed by `input_dim` inputs.
    /// Weights are Xavier-initialized from `rng`; biases start at zero.
    pub fn dense<R: Rng + ?Sized>(
        units: usize,
        activation: Activation,
        input_dim: usize,
        rng: &mut R,
    ) -> Result<Layer> {
        if units == 0 || input_dim == 0 {
            return Err(NnError::dims(format!(
                "dense layer needs positive sizes, got {input_dim} -> {units}"
            )));
        }
        let weights = Matrix::xavier(units, input_dim, rng)?;
        let biases = Matrix::zeros(units, 1)?;
        Layer::from_parameters(weights, biases, activation)
    }

    /// Builds a layer around existing parameters. `biases` must be
    /// `weights.rows() × 1`.
    pub fn from_parameters(weights: Matrix, biases: Matrix, activation: Activation) -> Result<Layer> {
        let (output_size, input_size) = weights.shape();
        if biases.shape() != (output_size, 1) {
            return Err(NnError::dims(format!(
                "biases are {}x{}, expected {output_size}x1",
                biases.rows(),
                biases.cols()
            )));
        }
        Ok(Layer {
            name: DEFAULT_LAYER_NAME.to_string(),
            input_size,
            output_size,
            activation,
            weight_grads: Matrix::zeros(output_size, input_size)?,
            bias_grads: Matrix::zeros(output_size, 1)?,
            weights,
            biases,
            cache: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Layer {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    /// Mutable views of the weight and bias buffers (shape-preserving).
    pub fn parameters_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (self.weights.as_mut_slice(), self.biases.as_mut_slice())
    }

    /// Replaces both parameter matrices; shapes must match the current ones.
    pub fn set_parameters(&mut self, weights: Matrix, biases: Matrix) -> Result<()> {
        if weights.shape() != self.weights.shape() || biases.shape() != self.biases.shape() {
            return Err(NnError::dims(format!(
                "parameters {}x{} / {}x{} do not fit layer {} -> {}",
                weights.rows(),
                weights.cols(),
                biases.rows(),
                biases.cols(),
                self.input_size,
                self.output_size
            )));
        }
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }

    /// ∂L/∂W from the last `backward` call, averaged over the batch.
    pub fn weight_gradients(&self) -> &Matrix {
        &self.weight_grads
    }

    pub fn bias_gradients(&self) -> &Matrix {
        &self.bias_grads
    }

    pub fn cache(&self) -> Option<&ForwardCache> {
        self.cache.as_ref()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Forward pass over a `batch × input_size` matrix. Replaces the cache.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols() != self.input_size {
            return Err(NnError::dims(format!(
                "input dimension mismatch: expected {}, got {}",
                self.input_size,
                input.cols()
            )));
        }
        let mut z = input.matmul_transposed(&self.weights)?;
        let bias = self.biases.as_slice();
        for i in 0..z.rows() {
            z.row_mut(i).iter_mut().zip(bias).for_each(|(v, b)| *v += b);
        }
        let output = self.activation.apply(&z);
        self.cache = Some(ForwardCache {
            input: input.clone(),
            z,
            output: output.clone(),
        });
        Ok(output)
    }

    /// Backward pass. `grad_output` is ∂L/∂output (`batch × output_size`).
    ///
    /// Stores the batch-averaged weight and bias gradients in the layer and
    /// returns ∂L/∂input (`batch × input_size`) for the previous layer.
    pub fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let cache = self.cache.as_ref().ok_or_else(|| {
            NnError::MissingArgument("layer cache is empty - run forward pass first".into())
        })?;
        if grad_output.shape() != cache.z.shape() {
            return Err(NnError::dims(format!(
                "gradient is {}x{}, expected {}x{}",
                grad_output.rows(),
                grad_output.cols(),
                cache.z.rows(),
                cache.z.cols()
            )));
        }

        // δ = ∂L/∂output ⊙ σ'(z)
        let delta = grad_output.hadamard(&self.activation.apply_derivative(&cache.z))?;
        let batch = delta.rows() as f64;

        let mut weight_grads = delta.transpose_matmul(&cache.input)?;
        weight_grads.scale_inplace(1.0 / batch);
        let bias_grads = delta.mean_over_rows();
        // W is out×in and δ is batch×out, so no transpose is needed here.
        let grad_input = delta.matmul(&self.weights)?;

        self.weight_grads = weight_grads;
        self.bias_grads = bias_grads;
        Ok(grad_input)
    }
}
