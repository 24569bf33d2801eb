//! Durability errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing a blob file
#[derive(Debug, Error)]
pub enum DurabilityError {
    /// The file does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure, with the file it happened on
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The value could not be encoded
    #[error("encode error: {0}")]
    Encode(String),

    /// The file contents could not be decoded
    #[error("decode error in {}: {message}", .path.display())]
    Decode {
        /// File being decoded
        path: PathBuf,
        /// Decoder message
        message: String,
    },
}

impl DurabilityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DurabilityError::NotFound(path)
        } else {
            DurabilityError::Io { path, source }
        }
    }

    /// Check if this is a missing-file error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DurabilityError::NotFound(_))
    }
}

/// Result type for durability operations
pub type Result<T> = std::result::Result<T, DurabilityError>;
