use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::data::{Label, Sample};
use crate::error::{NetError, Result};
use crate::layers::unit::{propagate_segment, Unit};
use crate::math::partition::{partition, split_ranges_mut};
use crate::network::execution::{ExecutionConfig, ExecutionMode};
use crate::network::metadata::ModelMetadata;

pub const DEFAULT_LEARNING_RATE: f64 = 0.25;

/// Fully connected sigmoid network.
///
/// `layers[0]` is the sensor layer; every unit of `layers[l]` is connected
/// to every unit of `layers[l - 1]`. The topology only changes through
/// [`Network::reinitialize`] or by loading a snapshot.
///
/// `Clone` is a deep copy of the weights. Use
/// [`SharedNetwork`](crate::network::SharedNetwork) when several owners
/// must train the same weights.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Vec<Unit>>,
    learning_rate: f64,
    execution: ExecutionConfig,
    metadata: Option<ModelMetadata>,
    pool: Option<Arc<ThreadPool>>,
}

impl Network {
    /// Builds a network with random weights; `structure[0]` is the sensor
    /// count and the last entry the class count.
    pub fn new(structure: &[usize]) -> Result<Network> {
        Network::with_rng(structure, DEFAULT_LEARNING_RATE, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(structure: &[usize], learning_rate: f64, rng: &mut R) -> Result<Network> {
        validate_learning_rate(learning_rate)?;
        let layers = random_layers(structure, rng)?;
        Ok(Network {
            layers,
            learning_rate,
            execution: ExecutionConfig::default(),
            metadata: None,
            pool: None,
        })
    }

    /// Assembles a network from already-built layers, checking that every
    /// unit has exactly one weight per unit of the layer below.
    pub(crate) fn from_layers(layers: Vec<Vec<Unit>>, learning_rate: f64) -> Result<Network> {
        validate_learning_rate(learning_rate)?;
        let structure: Vec<usize> = layers.iter().map(Vec::len).collect();
        validate_structure(&structure)?;
        if let Some(unit) = layers[0].iter().find(|unit| unit.fan_in() != 0) {
            return Err(NetError::Snapshot(format!(
                "sensor unit carries {} weights",
                unit.fan_in()
            )));
        }
        for (l, pair) in layers.windows(2).enumerate() {
            let fan_in = pair[0].len();
            if let Some(unit) = pair[1].iter().find(|unit| unit.fan_in() != fan_in) {
                return Err(NetError::Snapshot(format!(
                    "unit in layer {} has {} weights, expected {}",
                    l + 1,
                    unit.fan_in(),
                    fan_in
                )));
            }
        }
        Ok(Network {
            layers,
            learning_rate,
            execution: ExecutionConfig::default(),
            metadata: None,
            pool: None,
        })
    }

    /// Throws away every weight and rebuilds the topology from `structure`.
    ///
    /// Output label names survive only if they still match the class count.
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, structure: &[usize], learning_rate: f64, rng: &mut R) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.layers = random_layers(structure, rng)?;
        self.learning_rate = learning_rate;
        let class_count = self.class_count();
        if let Some(metadata) = self.metadata.as_mut() {
            if metadata.output_labels.as_ref().is_some_and(|names| names.len() != class_count) {
                metadata.output_labels = None;
            }
        }
        Ok(())
    }

    pub fn with_execution(mut self, execution: ExecutionConfig) -> Result<Network> {
        self.set_execution(execution)?;
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Network {
        self.metadata = Some(metadata);
        self
    }

    pub fn set_execution(&mut self, execution: ExecutionConfig) -> Result<()> {
        if execution.workers == 0 {
            return Err(NetError::InvalidConfig("worker count must be at least 1".into()));
        }
        if execution.workers != self.execution.workers {
            self.pool = None;
        }
        self.execution = execution;
        Ok(())
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn execution(&self) -> ExecutionConfig {
        self.execution
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    pub(crate) fn set_metadata(&mut self, metadata: Option<ModelMetadata>) {
        self.metadata = metadata;
    }

    /// Name of `label` from the metadata, if the network carries one.
    pub fn label_name(&self, label: Label) -> Option<&str> {
        self.metadata.as_ref()?.label_name(label)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn sensor_count(&self) -> usize {
        self.layers[0].len()
    }

    pub fn class_count(&self) -> usize {
        self.layers[self.layers.len() - 1].len()
    }

    pub fn structure(&self) -> Vec<usize> {
        self.layers.iter().map(Vec::len).collect()
    }

    pub fn layers(&self) -> &[Vec<Unit>] {
        &self.layers
    }

    /// Activations of the final layer from the most recent forward pass.
    pub fn output_activations(&self) -> Vec<f64> {
        self.layers[self.layers.len() - 1].iter().map(Unit::out).collect()
    }

    // -----------------------------------------------------------------------
    // Forward pass
    // -----------------------------------------------------------------------

    pub fn infer(&mut self, sample: &mut Sample) -> Result<()> {
        self.infer_with(sample, self.execution.mode)
    }

    /// Runs `sample` through the network, writes the final activations into
    /// its output and scores it.
    pub fn infer_with(&mut self, sample: &mut Sample, mode: ExecutionMode) -> Result<()> {
        self.check_shape(sample)?;
        let pool = match mode {
            ExecutionMode::Parallel => Some(self.pool()?),
            ExecutionMode::Sequential => None,
        };

        for (unit, &value) in self.layers[0].iter_mut().zip(sample.input()) {
            unit.out = value;
        }
        match pool {
            Some(pool) => self.activate_parallel(&pool),
            None => self.activate_sequential(),
        }

        let last = &self.layers[self.layers.len() - 1];
        for (slot, unit) in sample.output.iter_mut().zip(last) {
            *slot = unit.out;
        }
        sample.process_output();
        Ok(())
    }

    pub fn predict(&mut self, sample: &mut Sample) -> Result<Label> {
        self.infer(sample)?;
        Ok(sample.predicted_label())
    }

    fn check_shape(&self, sample: &Sample) -> Result<()> {
        if sample.input().len() != self.sensor_count() {
            return Err(NetError::InputShape {
                expected: self.sensor_count(),
                actual: sample.input().len(),
            });
        }
        if sample.class_count() != self.class_count() {
            return Err(NetError::OutputShape {
                expected: self.class_count(),
                actual: sample.class_count(),
            });
        }
        Ok(())
    }

    fn activate_sequential(&mut self) {
        for l in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(l);
            let previous = &done[l - 1];
            for unit in rest[0].iter_mut() {
                unit.activate(previous);
            }
        }
    }

    fn activate_parallel(&mut self, pool: &ThreadPool) {
        for l in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(l);
            let previous = &done[l - 1];
            let current = &mut rest[0];
            pool.install(|| current.par_iter_mut().for_each(|unit| unit.activate(previous)));
        }
    }

    // -----------------------------------------------------------------------
    // Backward pass
    // -----------------------------------------------------------------------

    /// Applies one delta-rule step for a sample already scored by `infer`.
    pub fn backward(&mut self, sample: &Sample, mode: ExecutionMode) -> Result<()> {
        let error = sample.error().ok_or(NetError::UnscoredSample)?;
        if error.len() != self.class_count() {
            return Err(NetError::OutputShape {
                expected: self.class_count(),
                actual: error.len(),
            });
        }
        let pool = match mode {
            ExecutionMode::Parallel => Some(self.pool()?),
            ExecutionMode::Sequential => None,
        };

        let last = self.layers.len() - 1;
        for (unit, &e) in self.layers[last].iter_mut().zip(error) {
            unit.error = e;
        }
        let alpha = self.learning_rate;
        match pool {
            Some(pool) => self.backpropagate_parallel(alpha, &pool),
            None => self.backpropagate_sequential(alpha),
        }
        Ok(())
    }

    fn backpropagate_sequential(&mut self, alpha: f64) {
        for l in (1..self.layers.len()).rev() {
            let (done, rest) = self.layers.split_at_mut(l);
            let previous = done[l - 1].as_mut_slice();
            previous.iter_mut().for_each(Unit::reset_error);
            for unit in rest[0].iter_mut() {
                unit.backpropagate(alpha, previous);
            }
        }
    }

    /// Per layer: clear the layer below, turn every error into a delta, then
    /// let each worker own one contiguous range of upstream indices. Workers
    /// touch disjoint upstream units and disjoint weight slots, so no locking
    /// is needed; `install` returning is the barrier between layers.
    fn backpropagate_parallel(&mut self, alpha: f64, pool: &ThreadPool) {
        let workers = self.execution.workers;
        for l in (1..self.layers.len()).rev() {
            let (done, rest) = self.layers.split_at_mut(l);
            let previous = done[l - 1].as_mut_slice();
            let current = rest[0].as_mut_slice();

            previous.iter_mut().for_each(Unit::reset_error);
            current.iter_mut().for_each(|unit| unit.apply_local_gradient(alpha));

            let ranges = partition(previous.len(), workers);
            let deltas: Vec<f64> = current.iter().map(Unit::error).collect();
            let mut weight_chunks: Vec<Vec<&mut [f64]>> = ranges
                .iter()
                .map(|_| Vec::with_capacity(current.len()))
                .collect();
            for unit in current.iter_mut() {
                let slices = split_ranges_mut(unit.weights.as_mut_slice(), &ranges);
                for (chunks, slice) in weight_chunks.iter_mut().zip(slices) {
                    chunks.push(slice);
                }
            }
            let upstream_chunks = split_ranges_mut(previous, &ranges);

            pool.install(|| {
                upstream_chunks
                    .into_par_iter()
                    .zip(weight_chunks)
                    .for_each(|(upstream, weights)| {
                        for (&delta, w) in deltas.iter().zip(weights) {
                            propagate_segment(delta, w, upstream, alpha);
                        }
                    });
            });
        }
    }

    fn pool(&mut self) -> Result<Arc<ThreadPool>> {
        if let Some(pool) = &self.pool {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(self.execution.workers)
                .build()?,
        );
        debug!(workers = self.execution.workers, "started worker pool");
        self.pool = Some(Arc::clone(&pool));
        Ok(pool)
    }
}

fn validate_structure(structure: &[usize]) -> Result<()> {
    if structure.len() < 2 {
        return Err(NetError::TooFewLayers(structure.len()));
    }
    if let Some(layer) = structure.iter().position(|&size| size == 0) {
        return Err(NetError::EmptyLayer(layer));
    }
    Ok(())
}

fn validate_learning_rate(learning_rate: f64) -> Result<()> {
    if !learning_rate.is_finite() {
        return Err(NetError::InvalidConfig(format!(
            "learning rate must be finite, got {learning_rate}"
        )));
    }
    Ok(())
}

fn random_layers<R: Rng + ?Sized>(structure: &[usize], rng: &mut R) -> Result<Vec<Vec<Unit>>> {
    validate_structure(structure)?;
    let mut layers = Vec::with_capacity(structure.len());
    layers.push((0..structure[0]).map(|_| Unit::sensor()).collect());
    for pair in structure.windows(2) {
        let (fan_in, size) = (pair[0], pair[1]);
        layers.push((0..size).map(|_| Unit::random(fan_in, rng)).collect());
    }
    Ok(layers)
}
