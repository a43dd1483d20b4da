use thiserror::Error;

/// Every failure the network, its samples and its snapshots can report.
///
/// Nothing is retried internally; errors surface from the operation that
/// detected them, and shape checks run before any weights are touched.
#[derive(Debug, Error)]
pub enum NetError {
    // Configuration
    #[error("a network needs at least two layers, got {0}")]
    TooFewLayers(usize),
    #[error("layer {0} has no units")]
    EmptyLayer(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    // Shape
    #[error("expected {expected} input values, got {actual}")]
    InputShape { expected: usize, actual: usize },
    #[error("expected {expected} output classes, sample has {actual}")]
    OutputShape { expected: usize, actual: usize },
    #[error("label {label} is out of range for {class_count} classes")]
    LabelOutOfRange { label: usize, class_count: usize },
    #[error("error accumulator has length {actual}, expected {expected}")]
    AccumulatorShape { expected: usize, actual: usize },

    // Usage
    #[error("sample has not been scored by a forward pass")]
    UnscoredSample,
    #[error("sample set is empty")]
    EmptySampleSet,

    // Persistence
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("inconsistent snapshot: {0}")]
    Snapshot(String),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, NetError>;
