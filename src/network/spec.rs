use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::network::execution::ExecutionConfig;
use crate::network::metadata::ModelMetadata;
use crate::network::network::{Network, DEFAULT_LEARNING_RATE};

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

/// A serializable description of a network before it has any weights.
///
/// ```json
/// {
///   "structure": [400, 64, 10],
///   "learning_rate": 0.25,
///   "execution": { "mode": "parallel", "workers": 8 },
///   "metadata": { "output_labels": ["A", "B", "C"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Layer sizes, sensors first and classes last.
    pub structure: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    pub fn new(structure: Vec<usize>) -> NetworkSpec {
        NetworkSpec {
            structure,
            learning_rate: DEFAULT_LEARNING_RATE,
            execution: ExecutionConfig::default(),
            metadata: None,
        }
    }

    /// Builds a network with fresh random weights.
    pub fn build(&self) -> Result<Network> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        let mut network = Network::with_rng(&self.structure, self.learning_rate, rng)?
            .with_execution(self.execution)?;
        if let Some(metadata) = &self.metadata {
            network = network.with_metadata(metadata.clone());
        }
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
