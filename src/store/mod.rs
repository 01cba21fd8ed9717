//! Series Store
//!
//! The read-only contract this crate needs from the backing time-series
//! store, plus an in-memory implementation.
//!
//! - **types**: SeriesInfo, TimeRange
//! - **filter**: Tag filters (equality + regex over tag values)
//! - **memory**: In-memory store with JSON fixture persistence
//! - **error**: Error types
//!
//! Retention, compaction and persistence belong to the store itself and
//! are not modelled here.

mod error;
mod filter;
mod memory;
mod types;

pub use error::{StoreError, StoreResult};
pub use filter::{TagFilter, TagMatcher};
pub use memory::{MemorySeriesStore, SeriesFixture, StoreFixture};
pub use types::{SeriesInfo, TimeRange};

use crate::snapshot::DataPoint;
use async_trait::async_trait;

/// Read access to a tenant-partitioned time-series store
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// All tenants known to the store
    async fn list_tenants(&self) -> StoreResult<Vec<String>>;

    /// Series of a tenant whose tags satisfy the filter
    async fn find_series(&self, tenant: &str, filter: &TagFilter) -> StoreResult<Vec<SeriesInfo>>;

    /// Points of one series within a time range, newest first
    async fn fetch_points(
        &self,
        tenant: &str,
        series_id: &str,
        range: TimeRange,
    ) -> StoreResult<Vec<DataPoint>>;
}
