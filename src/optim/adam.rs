//! Adam (Adaptive Moment Estimation) with per-layer moment buffers.
//!
//! ```text
//! m_t = β1 * m_{t-1} + (1 - β1) * g
//! v_t = β2 * v_{t-1} + (1 - β2) * g²
//! m̂ = m_t / (1 - β1^t)
//! v̂ = v_t / (1 - β2^t)
//! θ = θ - α * m̂ / (√v̂ + ε)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// When the shared timestep `t` advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestepPolicy {
    /// `t += 1` on every `step` call, i.e. once per layer per training step.
    /// A model with `L` layers advances `t` by `L` each batch. This is the
    /// historical behaviour and the default for file compatibility.
    #[default]
    PerLayerUpdate,
    /// `t += 1` once per training step via [`Adam::begin_step`]; `step`
    /// leaves it untouched.
    PerTrainingStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub timestep_policy: TimestepPolicy,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            timestep_policy: TimestepPolicy::default(),
        }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<()> {
        let beta_ok = |b: f64| (0.0..1.0).contains(&b);
        if !beta_ok(self.beta1) || !beta_ok(self.beta2) {
            return Err(NnError::InvalidConfig(format!(
                "Adam betas must lie in [0, 1), got {} and {}",
                self.beta1, self.beta2
            )));
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "Adam epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// First (`m`) and second (`v`) moment estimates for one layer, shaped like
/// its weights and biases.
#[derive(Debug, Clone)]
pub struct Moments {
    pub m_weights: Matrix,
    pub v_weights: Matrix,
    pub m_biases: Matrix,
    pub v_biases: Matrix,
}

impl Moments {
    fn zeros_like(layer: &Layer) -> Result<Moments> {
        let (wr, wc) = layer.weights.shape();
        let (br, bc) = layer.biases.shape();
        Ok(Moments {
            m_weights: Matrix::zeros(wr, wc)?,
            v_weights: Matrix::zeros(wr, wc)?,
            m_biases: Matrix::zeros(br, bc)?,
            v_biases: Matrix::zeros(br, bc)?,
        })
    }

    fn fits(&self, layer: &Layer) -> bool {
        self.m_weights.shape() == layer.weights.shape()
            && self.m_biases.shape() == layer.biases.shape()
    }
}

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    config: AdamConfig,
    timestep: u64,
    /// Indexed by layer position; allocated lazily on first update.
    moments: Vec<Option<Moments>>,
}

impl Adam {
    pub fn new(learning_rate: f64, config: AdamConfig) -> Result<Adam> {
        config.validate()?;
        Ok(Adam {
            learning_rate,
            config,
            timestep: 0,
            moments: Vec::new(),
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    pub fn moments(&self, layer_index: usize) -> Option<&Moments> {
        self.moments.get(layer_index).and_then(Option::as_ref)
    }

    /// Marks the start of a training step. Only advances the timestep under
    /// [`TimestepPolicy::PerTrainingStep`].
    pub fn begin_step(&mut self) {
        if self.config.timestep_policy == TimestepPolicy::PerTrainingStep {
            self.timestep += 1;
        }
    }

    /// Updates `layer` (at position `layer_index`) from its stored gradients.
    pub fn step(&mut self, layer: &mut Layer, layer_index: usize) -> Result<()> {
        if self.config.timestep_policy == TimestepPolicy::PerTrainingStep && self.timestep == 0 {
            return Err(NnError::MissingArgument(
                "begin_step must be called before the first Adam update".into(),
            ));
        }
        if self.moments.len() <= layer_index {
            self.moments.resize_with(layer_index + 1, || None);
        }
        let moments = match &mut self.moments[layer_index] {
            Some(existing) if !existing.fits(layer) => {
                return Err(NnError::dims(format!(
                    "layer {layer_index} no longer matches its Adam moment buffers"
                )));
            }
            Some(existing) => existing,
            empty => empty.insert(Moments::zeros_like(layer)?),
        };

        if self.config.timestep_policy == TimestepPolicy::PerLayerUpdate {
            self.timestep += 1;
        }

        let t = self.timestep as f64;
        let AdamConfig { beta1, beta2, epsilon, .. } = self.config;
        let rule = UpdateRule {
            lr: self.learning_rate,
            beta1,
            beta2,
            epsilon,
            correction1: 1.0 - beta1.powf(t),
            correction2: 1.0 - beta2.powf(t),
        };

        rule.apply(
            layer.weights.as_mut_slice(),
            layer.weight_grads.as_slice(),
            moments.m_weights.as_mut_slice(),
            moments.v_weights.as_mut_slice(),
        );
        rule.apply(
            layer.biases.as_mut_slice(),
            layer.bias_grads.as_slice(),
            moments.m_biases.as_mut_slice(),
            moments.v_biases.as_mut_slice(),
        );
        Ok(())
    }
}

struct UpdateRule {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    correction1: f64,
    correction2: f64,
}

impl UpdateRule {
    fn apply(&self, params: &mut [f64], grads: &[f64], m: &mut [f64], v: &mut [f64]) {
        for (((p, g), m), v) in params.iter_mut().zip(grads).zip(m.iter_mut()).zip(v.iter_mut()) {
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / self.correction1;
            let v_hat = *v / self.correction2;
            *p -= self.lr * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}
