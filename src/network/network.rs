use log::info;

use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::loss::{compute_loss, LossType};
use crate::math::matrix::Matrix;
use crate::optim::{AdamConfig, OptimizerKind, OptimizerState};
use crate::train::epoch_stats::TrainHistory;
use crate::train::loop_fn;
use crate::train::train_config::FitConfig;

pub const DEFAULT_MODEL_NAME: &str = "sequential_model";
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// An ordered stack of dense layers plus the loss and optimizer it trains with.
///
/// Lifecycle: create → [`add`](Self::add) layers → [`compile`](Self::compile)
/// → `predict` / `fit` / `evaluate` any number of times. Layer positions
/// double as the optimizer's per-layer state keys.
#[derive(Debug, Clone)]
pub struct SequentialModel {
    name: String,
    layers: Vec<Layer>,
    loss: LossType,
    optimizer_kind: OptimizerKind,
    learning_rate: f64,
    optimizer: Option<OptimizerState>,
}

impl Default for SequentialModel {
    fn default() -> Self {
        SequentialModel::new(DEFAULT_MODEL_NAME)
    }
}

impl SequentialModel {
    pub fn new(name: impl Into<String>) -> SequentialModel {
        SequentialModel {
            name: name.into(),
            layers: Vec::new(),
            loss: LossType::Mse,
            optimizer_kind: OptimizerKind::Sgd,
            learning_rate: DEFAULT_LEARNING_RATE,
            optimizer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to existing layers. Layers cannot be inserted or
    /// removed through this slice, so adjacency stays valid.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn optimizer_kind(&self) -> OptimizerKind {
        self.optimizer_kind
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn optimizer(&self) -> Option<&OptimizerState> {
        self.optimizer.as_ref()
    }

    pub fn is_compiled(&self) -> bool {
        self.optimizer.is_some()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Appends `layer`; its input size must equal the current output size.
    pub fn add(&mut self, layer: Layer) -> Result<()> {
        if let Some(tail) = self.layers.last() {
            if tail.output_size() != layer.input_size() {
                return Err(NnError::dims(format!(
                    "layer dimension mismatch: expected input size {}, got {}",
                    tail.output_size(),
                    layer.input_size()
                )));
            }
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Binds loss, optimizer and learning rate and allocates fresh optimizer
    /// state. Compiling again replaces the previous state.
    pub fn compile(&mut self, optimizer: OptimizerKind, loss: LossType, learning_rate: f64) -> Result<()> {
        self.compile_with(optimizer, loss, learning_rate, AdamConfig::default())
    }

    /// Like [`compile`](Self::compile) with explicit Adam hyper-parameters.
    pub fn compile_with(
        &mut self,
        optimizer: OptimizerKind,
        loss: LossType,
        learning_rate: f64,
        adam: AdamConfig,
    ) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::MissingArgument("model has no layers".into()));
        }
        let state = OptimizerState::with_adam_config(optimizer, learning_rate, adam)?;
        self.optimizer_kind = optimizer;
        self.loss = loss;
        self.learning_rate = learning_rate;
        self.optimizer = Some(state);
        info!(
            "compiled model '{}': {} layers, optimizer {optimizer}, loss {loss}, learning rate {learning_rate:.4}",
            self.name,
            self.layers.len()
        );
        Ok(())
    }

    /// Forward pass through every layer. Overwrites each layer's cache, so it
    /// must not be interleaved with an in-flight `backward`.
    pub fn predict(&mut self, input: &Matrix) -> Result<Matrix> {
        let (first, rest) = self
            .layers
            .split_first_mut()
            .ok_or_else(|| NnError::MissingArgument("model has no layers".into()))?;
        let mut current = first.forward(input)?;
        for layer in rest {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Backpropagates `loss_gradient` (∂L/∂prediction) from the output layer
    /// to the input layer. Returns ∂L/∂input.
    pub fn backward(&mut self, loss_gradient: &Matrix) -> Result<Matrix> {
        let mut gradient = loss_gradient.clone();
        for layer in self.layers.iter_mut().rev() {
            gradient = layer.backward(&gradient)?;
        }
        Ok(gradient)
    }

    /// Applies the optimizer to every layer, in forward order, using the
    /// gradients of the last `backward`. Counts as one training step.
    pub fn update_weights(&mut self) -> Result<()> {
        let optimizer = self.optimizer.as_mut().ok_or(NnError::NotCompiled)?;
        optimizer.begin_step();
        for (index, layer) in self.layers.iter_mut().enumerate() {
            optimizer.update(layer, index)?;
        }
        Ok(())
    }

    /// Trains on `x`/`y`; see [`FitConfig`] for batching and error handling.
    pub fn fit(&mut self, x: &Matrix, y: &Matrix, config: &FitConfig) -> Result<TrainHistory> {
        loop_fn::fit(self, x, y, config)
    }

    /// Loss of one full forward pass; parameters are left untouched.
    pub fn evaluate(&mut self, x: &Matrix, y: &Matrix) -> Result<f64> {
        if !self.is_compiled() {
            return Err(NnError::NotCompiled);
        }
        let predictions = self.predict(x)?;
        compute_loss(y, &predictions, self.loss)
    }

    /// Fraction of rows classified correctly. Multi-column targets compare
    /// argmax indices; single-column targets threshold predictions at 0.5.
    pub fn accuracy(&mut self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let predictions = self.predict(x)?;
        if predictions.shape() != y.shape() {
            return Err(NnError::dims(format!(
                "predictions are {}x{} but targets are {}x{}",
                predictions.rows(),
                predictions.cols(),
                y.rows(),
                y.cols()
            )));
        }
        let correct = (0..y.rows())
            .filter(|&i| {
                if y.cols() == 1 {
                    (predictions[(i, 0)] >= 0.5) == (y[(i, 0)] >= 0.5)
                } else {
                    predictions.argmax_row(i) == y.argmax_row(i)
                }
            })
            .count();
        Ok(correct as f64 / y.rows() as f64)
    }

    /// Restores saved header fields without compiling.
    pub(crate) fn set_training_settings(&mut self, optimizer: OptimizerKind, loss: LossType, learning_rate: f64) {
        self.optimizer_kind = optimizer;
        self.loss = loss;
        self.learning_rate = learning_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::math::rng::seeded_rng;

    fn two_layer_model() -> SequentialModel {
        let mut rng = seeded_rng(11);
        let mut model = SequentialModel::new("test");
        model.add(Layer::dense(3, Activation::Tanh, 2, &mut rng).unwrap()).unwrap();
        model.add(Layer::dense(1, Activation::Sigmoid, 3, &mut rng).unwrap()).unwrap();
        model
    }

    #[test]
    fn add_validates_adjacent_sizes() {
        let mut rng = seeded_rng(1);
        let mut model = two_layer_model();
        let res = model.add(Layer::dense(2, Activation::Linear, 4, &mut rng).unwrap());
        assert!(matches!(res, Err(NnError::InvalidDimension(_))));
        assert_eq!(model.num_layers(), 2);
    }

    #[test]
    fn compile_requires_layers_and_positive_rate() {
        let mut empty = SequentialModel::default();
        assert_eq!(empty.name(), DEFAULT_MODEL_NAME);
        assert!(empty.compile(OptimizerKind::Sgd, LossType::Mse, 0.1).is_err());

        let mut model = two_layer_model();
        assert!(model.compile(OptimizerKind::Sgd, LossType::Mse, 0.0).is_err());
        assert!(!model.is_compiled());
        model.compile(OptimizerKind::Adam, LossType::BinaryCrossEntropy, 0.01).unwrap();
        assert!(model.is_compiled());
        assert_eq!(model.optimizer_kind(), OptimizerKind::Adam);
    }

    #[test]
    fn recompiling_resets_optimizer_state() {
        let mut model = two_layer_model();
        model.compile(OptimizerKind::Adam, LossType::Mse, 0.01).unwrap();
        let x = Matrix::from_rows(vec![vec![0.1, 0.2]]).unwrap();
        let pred = model.predict(&x).unwrap();
        model.backward(&pred).unwrap();
        model.update_weights().unwrap();
        assert_eq!(model.optimizer().unwrap().timestep(), 2);
        model.compile(OptimizerKind::Adam, LossType::Mse, 0.01).unwrap();
        assert_eq!(model.optimizer().unwrap().timestep(), 0);
    }

    #[test]
    fn predict_chains_layers() {
        let mut model = two_layer_model();
        let out = model.predict(&Matrix::from_rows(vec![vec![0.5, -0.5], vec![1.0, 2.0]]).unwrap()).unwrap();
        assert_eq!(out.shape(), (2, 1));
        assert!(out.as_slice().iter().all(|p| *p > 0.0 && *p < 1.0));
        assert!(SequentialModel::default().predict(&out).is_err());
    }

    #[test]
    fn training_requires_compilation() {
        let mut model = two_layer_model();
        let x = Matrix::zeros(2, 2).unwrap();
        let y = Matrix::zeros(2, 1).unwrap();
        assert!(matches!(model.evaluate(&x, &y), Err(NnError::NotCompiled)));
        assert!(matches!(model.update_weights(), Err(NnError::NotCompiled)));
        assert!(matches!(model.fit(&x, &y, &FitConfig::new(1, 1)), Err(NnError::NotCompiled)));
    }

    #[test]
    fn accuracy_thresholds_single_column() {
        let mut model = SequentialModel::new("identity");
        model
            .add(Layer::from_parameters(Matrix::ones(1, 1).unwrap(), Matrix::zeros(1, 1).unwrap(), Activation::Linear).unwrap())
            .unwrap();
        let x = Matrix::from_vec(4, 1, vec![0.9, 0.1, 0.6, 0.4]).unwrap();
        let y = Matrix::from_vec(4, 1, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(model.accuracy(&x, &y).unwrap(), 0.75);
    }
}
