use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::data::{Label, Sample};
use crate::error::Result;
use crate::network::network::Network;

/// Cloneable handle to one live network.
///
/// Every clone points at the same weights: training through one handle is
/// visible through all of them. Calls are serialized by a mutex, so the
/// passes themselves still run one at a time.
#[derive(Debug, Clone)]
pub struct SharedNetwork {
    inner: Arc<Mutex<Network>>,
}

impl SharedNetwork {
    pub fn new(network: Network) -> SharedNetwork {
        SharedNetwork {
            inner: Arc::new(Mutex::new(network)),
        }
    }

    /// Locks the network for a sequence of operations. A panic in another
    /// holder does not poison the weights for everyone else.
    pub fn lock(&self) -> MutexGuard<'_, Network> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn predict(&self, sample: &mut Sample) -> Result<Label> {
        self.lock().predict(sample)
    }

    pub fn train(&self, sample: &mut Sample) -> Result<usize> {
        self.lock().train(sample)
    }

    /// True when both handles point at the same network.
    pub fn same_network(&self, other: &SharedNetwork) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deep copy of the current weights, detached from every handle.
    pub fn snapshot(&self) -> Network {
        self.lock().clone()
    }
}

impl From<Network> for SharedNetwork {
    fn from(network: Network) -> Self {
        SharedNetwork::new(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::execution::ExecutionConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clones_share_weights() {
        let network = Network::with_rng(&[2, 2], 0.25, &mut StdRng::seed_from_u64(8))
            .unwrap()
            .with_execution(ExecutionConfig::sequential())
            .unwrap();
        let first = SharedNetwork::new(network);
        let second = first.clone();
        assert!(first.same_network(&second));

        let before = second.snapshot().to_snapshot().layers;
        let mut sample = Sample::new(&[0.9, 0.1], 2, Label::Class(1)).unwrap();
        let iterations = first.train(&mut sample).unwrap();
        assert!(iterations > 0, "weights should need at least one update");

        let after = second.snapshot().to_snapshot().layers;
        assert_ne!(after, before);
        assert_eq!(after, first.snapshot().to_snapshot().layers);
    }

    #[test]
    fn separate_networks_are_not_shared() {
        let a = SharedNetwork::from(Network::new(&[2, 2]).unwrap());
        let b = SharedNetwork::from(Network::new(&[2, 2]).unwrap());
        assert!(!a.same_network(&b));
    }
}
