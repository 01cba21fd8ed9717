//! # Strata
//!
//! Inventory snapshot reconstruction and indexing for a time-series backed
//! monitoring system.
//!
//! Agents write their inventory as gzip-compressed, base64-encoded JSON
//! documents into string series, split across several data points when a
//! document is too large for one record. Strata reads those series back:
//!
//! - [`snapshot`]: Chunk reassembly, integrity checks and blueprint extraction
//! - [`store`]: The series store contract and an in-memory implementation
//! - [`discovery`]: Per-feed series lookup with isolated per-series failures
//! - [`inventory`]: In-memory resource/metric/type index with atomic rebuilds
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::discovery::{DiscoveryConfig, SeriesDiscovery};
//! use strata::store::MemorySeriesStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemorySeriesStore::from_fixture("store.json".as_ref())?;
//!     let discovery = SeriesDiscovery::new(Arc::new(store), DiscoveryConfig::default());
//!
//!     let now = chrono::Utc::now().timestamp_millis();
//!     let report = discovery.metric_type_series("acme", "agent-1", now).await?;
//!
//!     for metric_type in report.items() {
//!         println!("{} ({:?})", metric_type.id, metric_type.unit);
//!     }
//!     for failure in report.failures() {
//!         eprintln!("{}", failure);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod inventory;
pub mod snapshot;
pub mod store;

// Re-export top-level types for convenience
pub use snapshot::{
    AssembledDocument, Assembler, AssemblerLimits, DataPoint, EntityBlueprint, MetricBlueprint,
    MetricTypeBlueprint, MetricUnit, SnapshotError, SnapshotResult,
};

pub use store::{MemorySeriesStore, SeriesInfo, SeriesStore, StoreError, StoreResult, TagFilter, TimeRange};

pub use discovery::{
    DiscoveryConfig, DiscoveryReport, SeriesDiscovery, SeriesError, SeriesFailure, SeriesOutcome,
};

pub use inventory::{
    IndexStats, InventoryError, InventoryIndex, InventoryResult, Metric, Resource, ResourceNode,
    ResourceTree, ResourceType,
};

pub use config::{Config, ConfigError, LoggingConfig};
