pub mod adam;
pub mod optimizer_kind;
pub mod sgd;
pub mod state;

pub use adam::{Adam, AdamConfig, TimestepPolicy};
pub use optimizer_kind::OptimizerKind;
pub use sgd::Sgd;
pub use state::OptimizerState;
