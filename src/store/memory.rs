//! In-memory series store with JSON fixture persistence
//!
//! Holds tenants → series → points. Used by tests, benchmarks and the CLI,
//! which loads the store from a fixture file.
//!
//! # Fixture format
//! ```json
//! {
//!   "tenants": {
//!     "acme": {
//!       "inventory.f1.mt.heap": {
//!         "tags": {"module": "inventory", "feed": "f1", "type": "mt"},
//!         "points": [{"timestamp": 1000, "value": "H4sI..."}]
//!       }
//!     }
//!   }
//! }
//! ```

use crate::snapshot::DataPoint;
use crate::store::error::{StoreError, StoreResult};
use crate::store::filter::TagFilter;
use crate::store::types::{SeriesInfo, TimeRange};
use crate::store::SeriesStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tokio::sync::RwLock;

/// One series as written to a fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesFixture {
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub points: Vec<DataPoint>,
}

/// Serialization format for JSON persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFixture {
    /// tenant → series id → series
    #[serde(default)]
    pub tenants: BTreeMap<String, BTreeMap<String, SeriesFixture>>,
}

#[derive(Debug, Default)]
struct StoredSeries {
    tags: HashMap<String, String>,
    /// timestamp → point; a rewrite at the same timestamp replaces the point
    points: BTreeMap<i64, DataPoint>,
}

type Tenants = BTreeMap<String, BTreeMap<String, StoredSeries>>;

/// Series store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemorySeriesStore {
    tenants: RwLock<Tenants>,
}

impl MemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from fixture data
    pub fn from_fixture_data(fixture: StoreFixture) -> Self {
        let tenants = fixture
            .tenants
            .into_iter()
            .map(|(tenant, series)| {
                let series = series
                    .into_iter()
                    .map(|(id, fixture)| {
                        let points = fixture
                            .points
                            .into_iter()
                            .map(|p| (p.timestamp, p))
                            .collect();
                        (
                            id,
                            StoredSeries {
                                tags: fixture.tags,
                                points,
                            },
                        )
                    })
                    .collect();
                (tenant, series)
            })
            .collect();

        Self {
            tenants: RwLock::new(tenants),
        }
    }

    /// Load a store from a JSON fixture file
    pub fn from_fixture(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(|e| StoreError::Fixture {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let reader = BufReader::new(file);

        let fixture: StoreFixture =
            serde_json::from_reader(reader).map_err(|e| StoreError::Fixture {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        tracing::debug!(path = ?path, tenants = fixture.tenants.len(), "Loaded store fixture");
        Ok(Self::from_fixture_data(fixture))
    }

    /// Export the current content as fixture data
    pub async fn to_fixture_data(&self) -> StoreFixture {
        let tenants = self.tenants.read().await;

        StoreFixture {
            tenants: tenants
                .iter()
                .map(|(tenant, series)| {
                    let series = series
                        .iter()
                        .map(|(id, stored)| {
                            (
                                id.clone(),
                                SeriesFixture {
                                    tags: stored.tags.clone(),
                                    points: stored.points.values().cloned().collect(),
                                },
                            )
                        })
                        .collect();
                    (tenant.clone(), series)
                })
                .collect(),
        }
    }

    /// Write the current content to a JSON fixture file
    pub async fn save_fixture(&self, path: &Path) -> StoreResult<()> {
        let fixture = self.to_fixture_data().await;
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &fixture)?;
        Ok(())
    }

    /// Register a tenant, even without series
    pub async fn create_tenant(&self, tenant: &str) {
        self.tenants
            .write()
            .await
            .entry(tenant.to_string())
            .or_default();
    }

    /// Create a series, or replace the tags of an existing one
    pub async fn create_series(&self, tenant: &str, series: SeriesInfo) {
        let mut tenants = self.tenants.write().await;
        let stored = tenants
            .entry(tenant.to_string())
            .or_default()
            .entry(series.id)
            .or_default();
        stored.tags = series.tags;
    }

    /// Append points to an existing series
    pub async fn write(
        &self,
        tenant: &str,
        series_id: &str,
        points: impl IntoIterator<Item = DataPoint>,
    ) -> StoreResult<()> {
        let mut tenants = self.tenants.write().await;
        let stored = tenants
            .get_mut(tenant)
            .and_then(|series| series.get_mut(series_id))
            .ok_or_else(|| StoreError::SeriesNotFound {
                tenant: tenant.to_string(),
                series_id: series_id.to_string(),
            })?;

        for point in points {
            stored.points.insert(point.timestamp, point);
        }
        Ok(())
    }

    /// Number of points stored for a series
    pub async fn point_count(&self, tenant: &str, series_id: &str) -> usize {
        self.tenants
            .read()
            .await
            .get(tenant)
            .and_then(|series| series.get(series_id))
            .map(|stored| stored.points.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SeriesStore for MemorySeriesStore {
    async fn list_tenants(&self) -> StoreResult<Vec<String>> {
        Ok(self.tenants.read().await.keys().cloned().collect())
    }

    async fn find_series(&self, tenant: &str, filter: &TagFilter) -> StoreResult<Vec<SeriesInfo>> {
        let tenants = self.tenants.read().await;
        let Some(series) = tenants.get(tenant) else {
            return Ok(Vec::new());
        };

        Ok(series
            .iter()
            .filter(|(_, stored)| filter.matches_tags(&stored.tags))
            .map(|(id, stored)| SeriesInfo {
                id: id.clone(),
                tags: stored.tags.clone(),
            })
            .collect())
    }

    async fn fetch_points(
        &self,
        tenant: &str,
        series_id: &str,
        range: TimeRange,
    ) -> StoreResult<Vec<DataPoint>> {
        let tenants = self.tenants.read().await;
        let stored = tenants
            .get(tenant)
            .ok_or_else(|| StoreError::TenantNotFound(tenant.to_string()))?
            .get(series_id)
            .ok_or_else(|| StoreError::SeriesNotFound {
                tenant: tenant.to_string(),
                series_id: series_id.to_string(),
            })?;

        if range.start >= range.end {
            return Ok(Vec::new());
        }

        Ok(stored
            .points
            .range(range.start..range.end)
            .rev()
            .map(|(_, point)| point.clone())
            .collect())
    }
}
