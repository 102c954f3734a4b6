//! Error types for quire-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for quire-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quire-core.
///
/// A failing cell is not an error: the runner records it as an
/// [`ExecutionStatus`](crate::ExecutionStatus) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No notebook with this id.
    #[error("notebook not found: {0}")]
    NotFound(String),

    /// The resolved path is already registered to a notebook.
    #[error("path already registered to another notebook: {}", .0.display())]
    PathConflict(PathBuf),

    /// Cell index is not valid for the notebook.
    #[error("cell index {index} out of range (notebook has {len} cells)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Export format not recognised.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Caller supplied an unusable argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Document codec error.
    #[error("document error: {0}")]
    Document(#[from] quire_sync::SyncError),

    /// Database error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Format the error with a recovery hint, for display on the command line.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::NotFound(_) => Some("run `quire list` to see registered notebooks"),
            Self::PathConflict(_) => Some("choose another path or delete the existing notebook"),
            Self::IndexOutOfRange { .. } => Some("cell indices are zero-based"),
            Self::UnsupportedFormat(_) => Some("supported formats: document, script, rendered"),
            Self::Sqlite(_) => Some("check QUIRE_DB points at a writable location"),
            _ => None,
        };

        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}
