pub mod activation;
pub mod data;
pub mod error;
pub mod glyph;
pub mod layers;
pub mod logging;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use data::{Label, Sample, SampleSet};
pub use error::{NetError, Result};
pub use layers::Unit;
pub use network::{ExecutionConfig, ExecutionMode, ModelMetadata, Network, NetworkSnapshot, NetworkSpec, SharedNetwork};
pub use train::{evaluate, train_loop, EpochStats, TrainConfig};
