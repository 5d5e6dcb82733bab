use crate::error::{NnError, Result};
use crate::layers::dense::Layer;

#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies `param -= lr * grad` to the layer's weights and biases using
    /// the gradients stored by its last backward pass.
    pub fn step(&self, layer: &mut Layer) -> Result<()> {
        if layer.weights.shape() != layer.weight_grads.shape()
            || layer.biases.shape() != layer.bias_grads.shape()
        {
            return Err(NnError::dims("gradient buffers do not match parameters"));
        }
        let lr = self.learning_rate;
        for (w, g) in layer.weights.as_mut_slice().iter_mut().zip(layer.weight_grads.as_slice()) {
            *w -= lr * g;
        }
        for (b, g) in layer.biases.as_mut_slice().iter_mut().zip(layer.bias_grads.as_slice()) {
            *b -= lr * g;
        }
        Ok(())
    }
}
