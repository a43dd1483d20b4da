use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetError, Result};
use crate::layers::unit::{Unit, DEFAULT_BIAS_WEIGHT};
use crate::network::metadata::ModelMetadata;
use crate::network::network::{Network, DEFAULT_LEARNING_RATE};

/// Format version written by [`Network::save_json`].
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub weights: Vec<f64>,
    pub bias_weight: f64,
}

/// Persisted weights of a network. Bias weights are part of the format, so
/// save followed by load reproduces inference exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub version: u32,
    pub layer_count: usize,
    pub sensor_count: usize,
    pub class_count: usize,
    pub learning_rate: f64,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
    pub layers: Vec<Vec<UnitSnapshot>>,
}

/// Pre-versioning layout: per-unit weights only, `null` for sensors.
#[derive(Debug, Deserialize)]
struct LegacySnapshot {
    #[serde(rename = "CntLayers")]
    layer_count: usize,
    #[serde(rename = "CntSensors")]
    sensor_count: usize,
    #[serde(rename = "CntClasses")]
    class_count: usize,
    layers: Vec<Vec<LegacyUnit>>,
}

#[derive(Debug, Deserialize)]
struct LegacyUnit {
    weight: Option<Vec<f64>>,
}

impl From<LegacySnapshot> for NetworkSnapshot {
    fn from(legacy: LegacySnapshot) -> Self {
        let layers = legacy
            .layers
            .into_iter()
            .map(|layer| {
                layer
                    .into_iter()
                    .map(|unit| UnitSnapshot {
                        weights: unit.weight.unwrap_or_default(),
                        bias_weight: DEFAULT_BIAS_WEIGHT,
                    })
                    .collect()
            })
            .collect();
        NetworkSnapshot {
            version: SNAPSHOT_VERSION,
            layer_count: legacy.layer_count,
            sensor_count: legacy.sensor_count,
            class_count: legacy.class_count,
            learning_rate: DEFAULT_LEARNING_RATE,
            metadata: None,
            layers,
        }
    }
}

impl NetworkSnapshot {
    /// Parses either layout. A document with a `version` key is read as the
    /// current format only, so field errors are reported as such.
    pub fn from_json_str(json: &str) -> Result<NetworkSnapshot> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("version").is_some() {
            return Ok(serde_json::from_value(value)?);
        }
        let legacy: LegacySnapshot = serde_json::from_value(value)?;
        debug!("read legacy snapshot without bias weights");
        Ok(legacy.into())
    }

    fn check_header(&self) -> Result<()> {
        if self.version == 0 || self.version > SNAPSHOT_VERSION {
            return Err(NetError::UnsupportedVersion(self.version));
        }
        if self.layer_count != self.layers.len() {
            return Err(NetError::Snapshot(format!(
                "header says {} layers, found {}",
                self.layer_count,
                self.layers.len()
            )));
        }
        let sensors = self.layers.first().map_or(0, Vec::len);
        if self.sensor_count != sensors {
            return Err(NetError::Snapshot(format!(
                "header says {} sensors, first layer has {}",
                self.sensor_count, sensors
            )));
        }
        let classes = self.layers.last().map_or(0, Vec::len);
        if self.class_count != classes {
            return Err(NetError::Snapshot(format!(
                "header says {} classes, last layer has {}",
                self.class_count, classes
            )));
        }
        Ok(())
    }
}

impl From<&Network> for NetworkSnapshot {
    fn from(network: &Network) -> Self {
        let layers = network
            .layers()
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|unit| UnitSnapshot {
                        weights: unit.weights().to_vec(),
                        bias_weight: unit.bias_weight(),
                    })
                    .collect()
            })
            .collect();
        NetworkSnapshot {
            version: SNAPSHOT_VERSION,
            layer_count: network.layer_count(),
            sensor_count: network.sensor_count(),
            class_count: network.class_count(),
            learning_rate: network.learning_rate(),
            metadata: network.metadata().cloned(),
            layers,
        }
    }
}

impl Network {
    pub fn to_snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::from(self)
    }

    /// Rebuilds a network from a snapshot. Every unit is wired to the layer
    /// restored just before it; header and weight counts must agree.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Network> {
        snapshot.check_header()?;
        let layers = snapshot
            .layers
            .into_iter()
            .map(|layer| {
                layer
                    .into_iter()
                    .map(|unit| Unit::from_weights(unit.weights, unit.bias_weight))
                    .collect()
            })
            .collect();
        let mut network = Network::from_layers(layers, snapshot.learning_rate)?;
        network.set_metadata(snapshot.metadata);
        Ok(network)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_snapshot())?;
        debug!(path = %path.as_ref().display(), structure = ?self.structure(), "saved network");
        Ok(())
    }

    /// Loads a network previously written by `save_json`, or one in the
    /// legacy weights-only layout.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let network = Network::from_snapshot(NetworkSnapshot::from_json_str(&json)?)?;
        debug!(path = %path.as_ref().display(), structure = ?network.structure(), "loaded network");
        Ok(network)
    }
}
