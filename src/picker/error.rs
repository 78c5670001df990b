//! Errors surfaced by a photo transfer.
//!
//! Every variant ends up inside `SelectionState::Failure`, so the type is
//! `Clone` and carries plain data rather than source errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The bytes were fetched but are not a decodable image
    #[error("Import failed: {0}")]
    ImportFailed(String),

    /// Reading the picked item failed (missing file, permission denied, ...)
    #[error("Failed to read {}: {message}", path.display())]
    Io {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("{} is {size} bytes, the limit is {limit}", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The background decode task panicked or was aborted
    #[error("Transfer interrupted: {0}")]
    Interrupted(String),

    /// The transfer went away without reporting a result
    #[error("Transfer cancelled")]
    Cancelled,
}

impl LoadError {
    pub fn io(path: &Path, err: io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
