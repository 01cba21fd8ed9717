//! Inventory error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A resource reappeared on its own ancestor path
    #[error("Cycle detected in the tree with id {id}; aborting operation. The inventory is invalid.")]
    CycleDetected { id: String },

    /// An internal lock was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;
