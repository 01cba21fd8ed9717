//! Snapshot reconstruction error types
//!
//! Defines all errors that can occur while rebuilding an inventory
//! document from its chunk set.

use thiserror::Error;

/// Errors that can occur while reassembling a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No data point at all, typically because every chunk expired
    #[error("Missing inventory: no datapoint found. Did they expire?")]
    Missing,

    /// Chunk metadata does not add up (empty master, size or count mismatch)
    #[error("Invalid inventory snapshot: {0}")]
    Invalid(String),

    /// A fragment timestamp breaks the contiguous descending sequence
    #[error("Inventory sanity check failure: chunk n°{index} timestamp is {observed}, expecting {expected}")]
    ChunkOrder {
        index: usize,
        observed: i64,
        expected: i64,
    },

    /// Base64, gzip or JSON decoding failed
    #[error("Could not read assembled chunks: {0}")]
    Decode(String),

    /// Serializing or compressing a document for writing failed
    #[error("Could not encode inventory snapshot: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for SnapshotError {
    fn from(err: base64::DecodeError) -> Self {
        SnapshotError::Decode(format!("base64: {}", err))
    }
}

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
