use serde::{Deserialize, Serialize};

/// What `fit` does when one batch fails (e.g. NaN predictions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchErrorPolicy {
    /// Stop training and return the error.
    #[default]
    Abort,
    /// Log a warning, leave parameters untouched for that batch and continue.
    SkipBatch,
}

/// Configuration for a `fit` run.
///
/// # Fields
/// - `epochs`        : total number of full passes over the training data
/// - `batch_size`    : samples per mini-batch; `0` or anything larger than
///                      the dataset means full batch
/// - `verbose`       : log fit start, per-epoch averages and every 10th batch
/// - `on_batch_error`: abort on the first failing batch or skip it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub verbose: bool,
    pub on_batch_error: BatchErrorPolicy,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig::new(1, 0)
    }
}

impl FitConfig {
    /// Creates a quiet `FitConfig` that aborts on the first failing batch.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        FitConfig {
            epochs,
            batch_size,
            verbose: false,
            on_batch_error: BatchErrorPolicy::Abort,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn on_batch_error(mut self, policy: BatchErrorPolicy) -> Self {
        self.on_batch_error = policy;
        self
    }

    /// Batch size actually used for `num_samples` rows.
    pub fn effective_batch_size(&self, num_samples: usize) -> usize {
        if self.batch_size == 0 || self.batch_size > num_samples {
            num_samples
        } else {
            self.batch_size
        }
    }
}
