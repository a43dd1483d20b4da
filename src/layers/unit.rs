use std::ops::Range;

use rand::Rng;

use crate::activation::{sigmoid, sigmoid_derivative_from_output};
use crate::math::random::uniform_weights;

/// Constant input fed through every unit's bias weight.
pub const BIAS: f64 = -1.0;

/// Bias weight given to freshly built units and to units restored from
/// snapshots that do not carry one.
pub const DEFAULT_BIAS_WEIGHT: f64 = 0.01;

/// One neuron.
///
/// A unit owns the weights of its incoming connections, one per unit of the
/// preceding layer. It never stores a reference to that layer: the network
/// hands it in as a slice, so units only ever look one layer back.
/// Sensor units have no weights; their `out` is written directly.
///
/// Equality compares parameters only. `out` and `error` are scratch state
/// of the last pass.
#[derive(Debug, Clone)]
pub struct Unit {
    pub(crate) weights: Vec<f64>,
    pub(crate) bias_weight: f64,
    pub(crate) out: f64,
    pub(crate) error: f64,
}

impl PartialEq for Unit {
    fn eq(&self, other: &Unit) -> bool {
        self.weights == other.weights && self.bias_weight == other.bias_weight
    }
}

impl Unit {
    pub fn sensor() -> Unit {
        Unit::from_weights(Vec::new(), DEFAULT_BIAS_WEIGHT)
    }

    /// A unit fed by `fan_in` upstream units, weights drawn from `[-1, 1]`.
    pub fn random<R: Rng + ?Sized>(fan_in: usize, rng: &mut R) -> Unit {
        Unit::from_weights(uniform_weights(rng, fan_in), DEFAULT_BIAS_WEIGHT)
    }

    pub fn from_weights(weights: Vec<f64>, bias_weight: f64) -> Unit {
        Unit {
            weights,
            bias_weight,
            out: 0.0,
            error: 0.0,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias_weight(&self) -> f64 {
        self.bias_weight
    }

    pub fn out(&self) -> f64 {
        self.out
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn fan_in(&self) -> usize {
        self.weights.len()
    }

    pub fn reset_error(&mut self) {
        self.error = 0.0;
    }

    /// `out = sigmoid(bias_weight * BIAS + sum(w[i] * previous[i].out))`
    pub fn activate(&mut self, previous: &[Unit]) {
        debug_assert_eq!(previous.len(), self.weights.len());
        let sum: f64 = self
            .weights
            .iter()
            .zip(previous)
            .map(|(w, unit)| w * unit.out)
            .sum();
        self.out = sigmoid(self.bias_weight * BIAS + sum);
    }

    /// Turns the accumulated error into this unit's delta and moves the bias
    /// weight. Must run exactly once per backward pass, before any
    /// propagation.
    pub fn apply_local_gradient(&mut self, alpha: f64) {
        self.error *= sigmoid_derivative_from_output(self.out);
        self.bias_weight += alpha * BIAS * self.error;
    }

    /// Full sequential step: local gradient, error into `previous`, weight
    /// update, then clear this unit's error.
    pub fn backpropagate(&mut self, alpha: f64, previous: &mut [Unit]) {
        self.apply_local_gradient(alpha);
        propagate_segment(self.error, &mut self.weights, previous, alpha);
        self.reset_error();
    }

    /// Propagation and weight update restricted to upstream indices `range`.
    ///
    /// The caller applies the local gradient first and owns resetting both
    /// the upstream errors and this unit's error.
    pub fn backpropagate_range(&mut self, alpha: f64, previous: &mut [Unit], range: Range<usize>) {
        propagate_segment(
            self.error,
            &mut self.weights[range.clone()],
            &mut previous[range],
            alpha,
        );
    }
}

/// Pushes `delta` back through `weights` into `upstream` and then moves the
/// weights. `weights[i]` connects to `upstream[i]`; the error contribution
/// uses the weight as it was before this update.
pub(crate) fn propagate_segment(delta: f64, weights: &mut [f64], upstream: &mut [Unit], alpha: f64) {
    debug_assert_eq!(weights.len(), upstream.len());
    for (w, unit) in weights.iter_mut().zip(upstream.iter_mut()) {
        unit.error += delta * *w;
        *w += alpha * unit.out * delta;
    }
}
