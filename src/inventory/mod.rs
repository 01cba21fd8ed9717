//! Inventory
//!
//! In-memory inventory of resources, metrics and resource types, queried by
//! an external read API.
//!
//! - **types**: Resource, Metric, ResourceType, ResourceTree
//! - **index**: Staging + rebuildable lookup structures
//! - **error**: Error types

mod error;
mod index;
mod types;

pub use error::{InventoryError, InventoryResult};
pub use index::{IndexSnapshot, IndexStats, InventoryIndex};
pub use types::{
    InventoryDump, Metric, Operation, Resource, ResourceNode, ResourceTree, ResourceType,
};
