use tracing::trace;

use crate::data::Sample;
use crate::error::Result;
use crate::network::{ExecutionMode, Network};

/// Most forward/backward rounds spent on one sample per call to `train`.
pub const MAX_TRAIN_ITERATIONS: usize = 100;

/// Squared error below which a correctly classified sample counts as learned.
pub const CONVERGENCE_THRESHOLD: f64 = 0.1;

impl Network {
    pub fn train(&mut self, sample: &mut Sample) -> Result<usize> {
        self.train_with(sample, self.execution().mode)
    }

    /// Trains on one sample until it is classified correctly with squared
    /// error under [`CONVERGENCE_THRESHOLD`], or until
    /// [`MAX_TRAIN_ITERATIONS`] updates have been applied.
    ///
    /// Returns the number of updates applied: `0` means the sample was
    /// already learned and no weight moved.
    pub fn train_with(&mut self, sample: &mut Sample, mode: ExecutionMode) -> Result<usize> {
        for iteration in 0..MAX_TRAIN_ITERATIONS {
            self.infer_with(sample, mode)?;
            if sample.is_correct() && sample.estimated_error()? < CONVERGENCE_THRESHOLD {
                trace!(iteration, "sample converged");
                return Ok(iteration);
            }
            self.backward(sample, mode)?;
        }
        trace!("sample hit the iteration cap");
        Ok(MAX_TRAIN_ITERATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Label;
    use crate::network::snapshot::{NetworkSnapshot, UnitSnapshot, SNAPSHOT_VERSION};

    /// Two sensors wired straight to two confident outputs.
    fn confident_network() -> Network {
        let unit = |weights: Vec<f64>| UnitSnapshot { weights, bias_weight: 0.0 };
        let snapshot = NetworkSnapshot {
            version: SNAPSHOT_VERSION,
            layer_count: 2,
            sensor_count: 2,
            class_count: 2,
            learning_rate: 0.25,
            metadata: None,
            layers: vec![
                vec![unit(vec![]), unit(vec![])],
                vec![unit(vec![4.0, -4.0]), unit(vec![-4.0, 4.0])],
            ],
        };
        Network::from_snapshot(snapshot).unwrap()
    }

    #[test]
    fn learned_sample_returns_zero_without_touching_weights() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let mut network = confident_network();
            let before = network.to_snapshot();
            let mut sample = Sample::new(&[1.0, 0.0], 2, Label::Class(0)).unwrap();
            assert_eq!(network.train_with(&mut sample, mode).unwrap(), 0);
            assert_eq!(network.to_snapshot(), before);
            assert!(sample.is_correct());
        }
    }

    #[test]
    fn wrong_sample_needs_updates() {
        let mut network = confident_network();
        let mut sample = Sample::new(&[1.0, 0.0], 2, Label::Class(1)).unwrap();
        let iterations = network.train(&mut sample).unwrap();
        assert!(iterations > 0 && iterations <= MAX_TRAIN_ITERATIONS);
    }

    #[test]
    fn unlabeled_sample_hits_the_cap() {
        let mut network = Network::new(&[2, 2]).unwrap();
        let mut sample = Sample::unlabeled(&[0.5, 0.5], 2);
        assert_eq!(
            network.train_with(&mut sample, ExecutionMode::Sequential).unwrap(),
            MAX_TRAIN_ITERATIONS
        );
    }

    #[test]
    fn shape_errors_propagate() {
        let mut network = Network::new(&[3, 2]).unwrap();
        let mut sample = Sample::new(&[0.5, 0.5], 2, Label::Class(0)).unwrap();
        assert!(network.train(&mut sample).is_err());
    }
}
