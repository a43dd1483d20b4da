use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::data::SampleSet;
use crate::error::{NetError, Result};
use crate::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` on every sample of `set`, epoch after epoch, and returns
/// the accuracy of the last completed epoch as a percentage.
///
/// The set is shuffled once up front, not per epoch. Within an epoch each
/// sample is trained to convergence (see [`Network::train_with`]); a sample
/// counts as correct for the epoch when it needed no update at all.
///
/// # Early termination
/// The loop stops before `config.epochs` when:
/// - `1 - accuracy <= config.acceptable_error_rate`,
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// `EmptySampleSet` for an empty set; any shape error from a sample aborts
/// the run.
pub fn train_loop(network: &mut Network, set: &mut SampleSet, config: &TrainConfig) -> Result<f64> {
    if set.is_empty() {
        return Err(NetError::EmptySampleSet);
    }
    let mode = config.mode.unwrap_or(network.execution().mode);
    match config.seed {
        Some(seed) => set.shuffle_with(&mut StdRng::seed_from_u64(seed)),
        None => set.shuffle(),
    }

    let total = set.len();
    let run_start = Instant::now();
    let mut converged = 0;
    let mut epochs_completed = 0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }
        let t_start = Instant::now();

        converged = 0;
        for sample in set.iter_mut() {
            if network.train_with(sample, mode)? == 0 {
                converged += 1;
            }
        }
        epochs_completed = epoch;

        let accuracy = converged as f64 / total as f64;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        debug!(epoch, accuracy, elapsed_ms, "epoch finished");

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                converged,
                sample_count: total,
                accuracy,
                elapsed_ms,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }

        if 1.0 - accuracy <= config.acceptable_error_rate {
            debug!(epoch, "acceptable error rate reached");
            break;
        }
    }

    let accuracy = converged as f64 / total as f64;
    info!(
        epochs = epochs_completed,
        accuracy,
        elapsed_ms = run_start.elapsed().as_millis() as u64,
        "training finished"
    );
    Ok(accuracy * 100.0)
}

/// Fraction of samples `predict` classifies correctly; no weights change.
/// An empty set yields `0.0`.
pub fn evaluate(network: &mut Network, set: &mut SampleSet) -> Result<f64> {
    if set.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for sample in set.iter_mut() {
        network.predict(sample)?;
        if sample.is_correct() {
            correct += 1;
        }
    }
    Ok(correct as f64 / set.len() as f64)
}

impl Network {
    /// [`train_loop`] with only an epoch budget and a target error rate.
    pub fn train_on_set(&mut self, set: &mut SampleSet, epochs: usize, acceptable_error_rate: f64) -> Result<f64> {
        train_loop(self, set, &TrainConfig::new(epochs, acceptable_error_rate))
    }

    pub fn evaluate(&mut self, set: &mut SampleSet) -> Result<f64> {
        evaluate(self, set)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Label, Sample};
    use crate::network::ExecutionMode;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn toy_set() -> SampleSet {
        [
            (vec![-1.0, -1.0], 0),
            (vec![-0.8, -1.0], 0),
            (vec![1.0, 1.0], 1),
            (vec![1.0, 0.8], 1),
        ]
        .into_iter()
        .map(|(input, label)| Sample::new(&input, 2, Label::Class(label)).unwrap())
        .collect()
    }

    #[test]
    fn empty_set_cannot_be_trained() {
        let mut network = Network::new(&[2, 2]).unwrap();
        let mut set = SampleSet::new();
        assert!(matches!(
            network.train_on_set(&mut set, 5, 0.0),
            Err(NetError::EmptySampleSet)
        ));
        assert_eq!(network.evaluate(&mut set).unwrap(), 0.0);
    }

    #[test]
    fn progress_is_reported_per_epoch() {
        let mut network = Network::new(&[2, 2]).unwrap();
        let mut set = toy_set();
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(3, -1.0)
            .with_mode(ExecutionMode::Sequential)
            .with_seed(1);
        config.progress_tx = Some(tx);

        train_loop(&mut network, &mut set, &config).unwrap();
        drop(config);

        let stats: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(stats.len(), 3);
        for (i, s) in stats.iter().enumerate() {
            assert_eq!(s.epoch, i + 1);
            assert_eq!(s.total_epochs, 3);
            assert_eq!(s.sample_count, 4);
            assert!((0.0..=1.0).contains(&s.accuracy));
        }
    }

    #[test]
    fn stop_flag_prevents_training() {
        let mut network = Network::new(&[2, 2]).unwrap();
        let before = network.layers().to_vec();
        let mut set = toy_set();
        let mut config = TrainConfig::new(10, 0.0);
        config.stop_flag = Some(Arc::new(AtomicBool::new(true)));

        assert_eq!(train_loop(&mut network, &mut set, &config).unwrap(), 0.0);
        assert_eq!(network.layers(), &before[..]);
    }
}
