pub mod execution;
pub mod metadata;
pub mod network;
pub mod shared;
pub mod snapshot;
pub mod spec;

pub use execution::{ExecutionConfig, ExecutionMode};
pub use metadata::ModelMetadata;
pub use network::{Network, DEFAULT_LEARNING_RATE};
pub use shared::SharedNetwork;
pub use snapshot::NetworkSnapshot;
pub use spec::NetworkSpec;
