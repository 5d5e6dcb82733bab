use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::optim::adam::{Adam, AdamConfig};
use crate::optim::optimizer_kind::OptimizerKind;
use crate::optim::sgd::Sgd;

/// Mutable optimizer state bound to one compiled model.
#[derive(Debug, Clone)]
pub enum OptimizerState {
    Sgd(Sgd),
    Adam(Adam),
}

impl OptimizerState {
    /// Builds state for `kind`, using default Adam hyper-parameters.
    pub fn new(kind: OptimizerKind, learning_rate: f64) -> Result<OptimizerState> {
        OptimizerState::with_adam_config(kind, learning_rate, AdamConfig::default())
    }

    /// `adam` is ignored for SGD.
    pub fn with_adam_config(
        kind: OptimizerKind,
        learning_rate: f64,
        adam: AdamConfig,
    ) -> Result<OptimizerState> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be positive, got {learning_rate}"
            )));
        }
        Ok(match kind {
            OptimizerKind::Sgd => OptimizerState::Sgd(Sgd::new(learning_rate)),
            OptimizerKind::Adam => OptimizerState::Adam(Adam::new(learning_rate, adam)?),
        })
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            OptimizerState::Sgd(_) => OptimizerKind::Sgd,
            OptimizerState::Adam(_) => OptimizerKind::Adam,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match self {
            OptimizerState::Sgd(sgd) => sgd.learning_rate,
            OptimizerState::Adam(adam) => adam.learning_rate(),
        }
    }

    /// Adam's shared timestep; always 0 for SGD.
    pub fn timestep(&self) -> u64 {
        match self {
            OptimizerState::Sgd(_) => 0,
            OptimizerState::Adam(adam) => adam.timestep(),
        }
    }

    /// Called once per training step, before the per-layer updates.
    pub fn begin_step(&mut self) {
        if let OptimizerState::Adam(adam) = self {
            adam.begin_step();
        }
    }

    /// Applies one update to `layer`; `layer_index` keys Adam's moment buffers.
    pub fn update(&mut self, layer: &mut Layer, layer_index: usize) -> Result<()> {
        match self {
            OptimizerState::Sgd(sgd) => sgd.step(layer),
            OptimizerState::Adam(adam) => adam.step(layer, layer_index),
        }
    }
}
