//! Backing store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a series store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Tenant is not known to the store
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    /// Series is not known for the tenant
    #[error("Series not found: {tenant}/{series_id}")]
    SeriesNotFound { tenant: String, series_id: String },

    /// Tag filter could not be built
    #[error("Invalid tag filter: {0}")]
    InvalidFilter(String),

    /// Store fixture could not be loaded or written
    #[error("Fixture error for {path:?}: {error}")]
    Fixture { path: PathBuf, error: String },

    /// Remote or transient failure reported by a store implementation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<regex::Error> for StoreError {
    fn from(err: regex::Error) -> Self {
        StoreError::InvalidFilter(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
