//! Progress store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the progress store and its backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error in the file backend.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored value does not parse as a progress document.
    #[error("stored data under '{key}' is corrupt")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize progress data")]
    Serialize(#[from] serde_json::Error),
}
