//! Error types for document store operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for DocumentStore operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in DocumentStore operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure (permissions, disk full, ...)
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document on disk is not valid JSON
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A string handed to `write` did not parse as JSON
    #[error("Invalid input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    /// The value is valid JSON but its root is not an object
    #[error("Document root must be an object, got {0}")]
    NotAnObject(&'static str),

    /// A nested key path did not resolve inside the document
    #[error("Key '{0}' not found")]
    KeyNotFound(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from the caller's input rather than the disk
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StoreError::InvalidInput(_) | StoreError::NotAnObject(_))
    }
}
