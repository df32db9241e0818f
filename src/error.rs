use thiserror::Error;

/// Errors that can occur in distil-kge.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Triple with ids outside the declared entity/relation ranges.
    #[error("Invalid triple: {0}")]
    InvalidTriple(String),
    /// Empty triple set or empty catalog where data is required.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
    /// Invalid configuration, rejected at construction time.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Embedding table shape does not match the model's declared dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// Label not present in a catalog.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for distil-kge.
pub type Result<T> = std::result::Result<T, Error>;
