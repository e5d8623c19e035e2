use std::path::PathBuf;
use thiserror::Error;

/// Every fallible operation in the crate reports one of these.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("a network needs at least 3 layers (input, hidden, output), got {found}")]
    TooFewLayers { found: usize },

    #[error("layer {layer} must contain at least one unit")]
    EmptyLayer { layer: usize },

    #[error("{what}: expected length {expected}, got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unit {unit} does not exist in layer {layer} ({len} units)")]
    UnitOutOfRange { layer: usize, unit: usize, len: usize },

    #[error("layer index {index} is out of range ({count} layers)")]
    LayerOutOfRange { index: usize, count: usize },

    #[error("connectivity index {index} is out of range ({count} connectivities)")]
    ConnectivityOutOfRange { index: usize, count: usize },

    #[error("connectivity {connectivity} already links unit {prev} to unit {next}")]
    DuplicateEdge {
        connectivity: usize,
        prev: usize,
        next: usize,
    },

    #[error("data set has {images} images but {labels} labels")]
    LabelCountMismatch { images: usize, labels: usize },

    #[error("invalid data format: {0}")]
    InvalidDataFormat(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("refusing to overwrite existing file {} (pass overwrite to replace it)", .0.display())]
    TargetExists(PathBuf),

    #[error("unsupported network format '{found}'")]
    UnsupportedFormat { found: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
