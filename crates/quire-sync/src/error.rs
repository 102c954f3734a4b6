//! Error types for the document codec.

use std::path::PathBuf;

/// Result type for codec operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reading or writing notebook documents.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Failed to read a document file.
    #[error("Failed to read file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write a document file.
    #[error("Failed to write file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Failed to serialize/deserialize JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Document parsed but does not have a supported shape.
    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),
}
