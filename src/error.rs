//! Error types for the powercast crate

use thiserror::Error;

/// Custom error types for the powercast crate
#[derive(Debug, Error)]
pub enum PowercastError {
    /// Not enough consumption history to build features or forecast
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// No trained artifact exists for the requested model type
    #[error("Model not trained yet: {0}")]
    ModelNotFound(String),

    /// Degenerate or invalid training data
    #[error("Training error: {0}")]
    Training(String),

    /// Malformed upload or invalid parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error related to record handling or inference
    #[error("Data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing or deserializing an artifact
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PowercastError>;

impl From<serde_json::Error> for PowercastError {
    fn from(err: serde_json::Error) -> Self {
        PowercastError::Serialization(err.to_string())
    }
}
