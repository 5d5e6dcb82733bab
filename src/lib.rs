pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod optim;
pub mod network;
pub mod train;
pub mod data;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use math::rng::seeded_rng;
pub use activation::activation::Activation;
pub use layers::dense::Layer;
pub use loss::{compute_loss, compute_loss_gradient, LossType};
pub use optim::{AdamConfig, OptimizerKind, OptimizerState, TimestepPolicy};
pub use network::{ModelSpec, SequentialModel};
pub use train::{BatchErrorPolicy, EpochStats, FitConfig, TrainHistory};
pub use data::{train_test_split, TrainTestSplit};
