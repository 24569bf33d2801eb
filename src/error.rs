//! Unified error types for varstore.
//!
//! Every store operation returns [`Result`]. Internal durability errors are
//! converted here so callers see one stable error type.

use thiserror::Error;
use varstore_durability::DurabilityError;

/// All varstore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Identity lookup found no binding for the value in the scope
    #[error("could not determine variable name for {type_name} value")]
    NameResolution {
        /// Variant name of the unresolved value
        type_name: &'static str,
    },

    /// Name absent where presence is required
    #[error("not found: {0}")]
    NotFound(String),

    /// Name present where absence is required
    #[error("variable '{0}' already exists")]
    DuplicateKey(String),

    /// Argument or loaded data of the wrong kind
    #[error("wrong type: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected kind
        expected: String,
        /// Actual kind found
        actual: String,
    },

    /// Variable names must be non-empty
    #[error("invalid variable name: {0:?}")]
    InvalidName(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Undecodable or invalid file contents
    #[error("corruption: {0}")]
    Corruption(String),

    /// Log sink could not be installed
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type for varstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this is a duplicate-key error.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }

    /// Check if identity-based name resolution failed.
    pub fn is_name_resolution(&self) -> bool {
        matches!(self, Error::NameResolution { .. })
    }

    pub(crate) fn type_mismatch(expected: &str, actual: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

// Convert from durability errors
impl From<DurabilityError> for Error {
    fn from(e: DurabilityError) -> Self {
        match e {
            DurabilityError::NotFound(path) => Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )),
            DurabilityError::Io { path, source } => Error::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {}", path.display(), source),
            )),
            DurabilityError::Encode(msg) => Error::Serialization(msg),
            DurabilityError::Decode { path, message } => {
                Error::Corruption(format!("{}: {}", path.display(), message))
            }
        }
    }
}
