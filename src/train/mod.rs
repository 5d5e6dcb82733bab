pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::{EpochStats, TrainHistory};
pub use loop_fn::fit;
pub use train_config::{BatchErrorPolicy, FitConfig};
pub use trainer::train_step;
