//! Error types for resource loading

use crate::pak::PakError;
use thiserror::Error;

/// Resource operation result type
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors raised while locating or loading resources
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No mounted provider has the path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// No loader registered for the requested resource type
    #[error("No loader registered for {0}")]
    NoLoader(&'static str),

    /// A loader is already registered for the resource type
    #[error("Loader already registered for {0}")]
    LoaderExists(&'static str),

    /// A loader rejected the resource bytes
    #[error("Failed to load {path}: {reason}")]
    Load {
        /// Logical path being loaded
        path: String,
        /// Loader supplied reason
        reason: String,
    },

    /// Pak archive error
    #[error("Pak error: {0}")]
    Pak(#[from] PakError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
