pub mod network;
pub mod persist;
pub mod spec;
pub mod summary;

pub use network::SequentialModel;
pub use spec::{CompileSpec, LayerSpec, ModelSpec};
