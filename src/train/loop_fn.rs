use std::time::Instant;

use log::{debug, info, warn};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::SequentialModel;
use crate::train::epoch_stats::{EpochStats, TrainHistory};
use crate::train::train_config::{BatchErrorPolicy, FitConfig};
use crate::train::trainer::train_step;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` for `config.epochs` epochs and returns per-epoch stats.
///
/// Samples are split into contiguous batches in their original row order;
/// shuffling is the caller's job (see `data::split::shuffle_rows`). The
/// last batch of an epoch may be smaller than the others.
///
/// # Errors
/// - `NotCompiled` if the model has not been compiled
/// - `InvalidDimension` if `x`/`y` row counts differ or their widths do not
///   match the first layer's input / last layer's output
/// - any batch error when `config.on_batch_error` is `Abort`
pub fn fit(
    model: &mut SequentialModel,
    x: &Matrix,
    y: &Matrix,
    config: &FitConfig,
) -> Result<TrainHistory> {
    if !model.is_compiled() {
        return Err(NnError::NotCompiled);
    }
    check_dataset(model, x, y)?;

    let num_samples = x.rows();
    let batch_size = config.effective_batch_size(num_samples);
    let num_batches = num_samples.div_ceil(batch_size);

    if config.verbose {
        info!(
            "starting training: {num_samples} samples, batch size {batch_size}, \
             {num_batches} batches per epoch, {} epochs",
            config.epochs
        );
    }

    let mut history = TrainHistory::default();
    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let pass = run_one_epoch(model, x, y, batch_size, epoch, config)?;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            loss: pass.mean_loss(),
            batches: num_batches,
            skipped_batches: pass.skipped,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        if config.verbose {
            info!("epoch {epoch}/{} - average loss: {:.6}", config.epochs, stats.loss);
        }
        history.epochs.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct EpochPass {
    weighted_loss: f64,
    samples: usize,
    skipped: usize,
}

impl EpochPass {
    fn mean_loss(&self) -> f64 {
        if self.samples == 0 {
            f64::NAN
        } else {
            self.weighted_loss / self.samples as f64
        }
    }
}

/// Runs every batch of one epoch, in row order.
fn run_one_epoch(
    model: &mut SequentialModel,
    x: &Matrix,
    y: &Matrix,
    batch_size: usize,
    epoch: usize,
    config: &FitConfig,
) -> Result<EpochPass> {
    let num_samples = x.rows();
    let num_batches = num_samples.div_ceil(batch_size);
    let mut pass = EpochPass::default();

    for (batch, start) in (0..num_samples).step_by(batch_size).enumerate() {
        let end = (start + batch_size).min(num_samples);
        let x_batch = x.slice_rows(start, end)?;
        let y_batch = y.slice_rows(start, end)?;

        match train_step(model, &x_batch, &y_batch) {
            Ok(batch_loss) => {
                pass.weighted_loss += batch_loss * (end - start) as f64;
                pass.samples += end - start;
                if config.verbose && batch % 10 == 0 {
                    debug!(
                        "epoch {epoch}, batch {}/{num_batches} - loss: {batch_loss:.6}",
                        batch + 1
                    );
                }
            }
            Err(err) => match config.on_batch_error {
                BatchErrorPolicy::Abort => return Err(err),
                BatchErrorPolicy::SkipBatch => {
                    warn!("epoch {epoch}, batch {}/{num_batches} skipped: {err}", batch + 1);
                    pass.skipped += 1;
                }
            },
        }
    }

    Ok(pass)
}

fn check_dataset(model: &SequentialModel, x: &Matrix, y: &Matrix) -> Result<()> {
    if x.rows() != y.rows() {
        return Err(NnError::dims(format!(
            "X and y must have the same number of samples, got {} and {}",
            x.rows(),
            y.rows()
        )));
    }
    let layers = model.layers();
    if let (Some(first), Some(last)) = (layers.first(), layers.last()) {
        if x.cols() != first.input_size() {
            return Err(NnError::dims(format!(
                "X has {} features, model expects {}",
                x.cols(),
                first.input_size()
            )));
        }
        if y.cols() != last.output_size() {
            return Err(NnError::dims(format!(
                "y has {} columns, model produces {}",
                y.cols(),
                last.output_size()
            )));
        }
    }
    Ok(())
}
