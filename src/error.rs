//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing or delivering an artifact
#[derive(Error, Debug)]
pub enum Error {
    /// The caller passed no result to an operation that requires one
    #[error("Algorithm result expected, but got {0}")]
    ContractViolation(String),

    /// Failed to turn a result field into text
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    /// Failed to build or read an archive
    #[error("Archive generation failed: {0}")]
    ArchiveError(String),

    /// Failed to capture the visual state
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Capture did not finish within the configured bound
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Failed to assemble the document
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The sink refused the artifact
    #[error("Delivery failed: {0}")]
    DeliveryError(String),

    /// Underlying I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a caller-contract violation rather than a
    /// recoverable failure of the pipeline.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::ContractViolation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::RenderError(err.to_string())
    }
}
