use serde::{Deserialize, Serialize};

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 16;

/// How a forward or backward pass spreads work inside one layer.
///
/// Both modes give bit-identical results; layers are always processed one
/// after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

/// Default execution mode plus the width of the worker pool used by
/// parallel passes. The backward pass splits each upstream layer into
/// exactly `workers` index ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            mode: ExecutionMode::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl ExecutionConfig {
    pub fn sequential() -> Self {
        ExecutionConfig {
            mode: ExecutionMode::Sequential,
            ..ExecutionConfig::default()
        }
    }

    pub fn parallel(workers: usize) -> Self {
        ExecutionConfig {
            mode: ExecutionMode::Parallel,
            workers,
        }
    }
}
