use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::network::ExecutionMode;
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`                — upper bound on full passes over the set
/// - `acceptable_error_rate` — stop once `1 - accuracy` drops to this value
/// - `mode`                  — sequential or parallel passes; `None` uses the
///                             network's own default
/// - `seed`                  — seeds the one-off shuffle; `None` draws from
///                             the thread RNG
/// - `progress_tx`           — optional channel; one `EpochStats` per
///                             completed epoch. Dropping the receiver stops
///                             the loop.
/// - `stop_flag`             — optional atomic flag checked between epochs.
pub struct TrainConfig {
    pub epochs: usize,
    pub acceptable_error_rate: f64,
    pub mode: Option<ExecutionMode>,
    pub seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize, acceptable_error_rate: f64) -> Self {
        TrainConfig {
            epochs,
            acceptable_error_rate,
            mode: None,
            seed: None,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
