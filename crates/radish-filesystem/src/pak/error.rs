//! Error types for pak archive operations

use std::path::PathBuf;
use thiserror::Error;

/// Pak operation result type
pub type PakResult<T> = Result<T, PakError>;

/// Errors raised while building or reading pak archives
#[derive(Debug, Error)]
pub enum PakError {
    /// Header signature or version check failed
    #[error("Pak header invalid: {}", path.display())]
    InvalidHeader {
        /// Header file that failed validation
        path: PathBuf,
    },

    /// Mutation attempted on an entry table opened for reading
    #[error("Entry table is read-only")]
    ReadOnly,

    /// Build options rejected before any work was done
    #[error("Invalid build options: {0}")]
    InvalidOptions(String),

    /// Offset or length does not fit the 32-bit wire fields
    #[error("Value {value} for {path} does not fit in 32 bits")]
    OffsetOverflow {
        /// Logical path of the entry being written
        path: String,
        /// Value that overflowed
        value: u64,
    },

    /// Partition index does not fit the 16-bit wire field
    #[error("Partition index {0} out of range")]
    PartitionOverflow(i32),

    /// Malformed header bytes
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Build manifest could not be parsed
    #[error("Invalid build manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PakError {
    /// Check if the archive on disk is unusable as-is
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. } | Self::InvalidFormat(_) | Self::BinRead(_)
        )
    }
}
