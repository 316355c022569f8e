//! Error types for metrics export

use thiserror::Error;

/// Errors related to exporting run results
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
