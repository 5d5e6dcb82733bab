use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::Result;
use crate::layers::dense::Layer;
use crate::loss::LossType;
use crate::network::network::{SequentialModel, DEFAULT_MODEL_NAME};
use crate::optim::{AdamConfig, OptimizerKind};

/// Describes one layer in a model specification.
///
/// Fields:
/// - `units`     : number of neurons in this layer
/// - `input_size`: number of values feeding into this layer (the previous
///                  layer's `units`, or the raw feature count for the first)
/// - `activation`: activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub units: usize,
    pub input_size: usize,
    pub activation: Activation,
}

/// Training settings applied by [`ModelSpec::build`] when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSpec {
    pub optimizer: OptimizerKind,
    pub loss: LossType,
    pub learning_rate: f64,
    #[serde(default)]
    pub adam: AdamConfig,
}

/// A serializable description of a model architecture, independent of any
/// trained parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default = "default_name")]
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub compile: Option<CompileSpec>,
}

fn default_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl ModelSpec {
    /// Captures the architecture (and training settings, if compiled) of
    /// an existing model.
    pub fn from_model(model: &SequentialModel) -> ModelSpec {
        let compile = model.optimizer().map(|state| CompileSpec {
            optimizer: model.optimizer_kind(),
            loss: model.loss(),
            learning_rate: model.learning_rate(),
            adam: match state {
                crate::optim::OptimizerState::Adam(adam) => *adam.config(),
                crate::optim::OptimizerState::Sgd(_) => AdamConfig::default(),
            },
        });
        ModelSpec {
            name: model.name().to_string(),
            layers: model
                .layers()
                .iter()
                .map(|l| LayerSpec {
                    units: l.output_size(),
                    input_size: l.input_size(),
                    activation: l.activation(),
                })
                .collect(),
            compile,
        }
    }

    /// Creates freshly initialized layers from `rng` and compiles the model
    /// when `compile` is set.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SequentialModel> {
        let mut model = SequentialModel::new(self.name.clone());
        for spec in &self.layers {
            model.add(Layer::dense(spec.units, spec.activation, spec.input_size, rng)?)?;
        }
        if let Some(c) = &self.compile {
            model.compile_with(c.optimizer, c.loss, c.learning_rate, c.adam)?;
        }
        Ok(model)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `ModelSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<ModelSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
