//! Series Discovery
//!
//! Finds the inventory series of a feed in the backing store and turns each
//! one into blueprints:
//!
//! ```text
//!   find_series(tags) → [series] → buffer_unordered(N) → fetch → assemble → extract
//!                                                                        ↓
//!                                                         SeriesOutcome (item or failure)
//! ```
//!
//! Every series is a separate unit of work. A unit that fails is reported
//! in the `DiscoveryReport` with its series id and never stops its siblings.
//! Only the candidate lookup itself can fail a whole call.
//!
//! # Tag vocabulary
//!
//! | tag      | value                                          |
//! |----------|------------------------------------------------|
//! | `module` | always `inventory`                             |
//! | `feed`   | feed identifier                                |
//! | `type`   | `mt` (metric type) or `r` (resource)           |
//! | `mtypes` | metric type ids packed as `\|id1\|id2\|`       |

mod error;
mod report;

pub use error::{SeriesError, SeriesFailure};
pub use report::{DiscoveryReport, SeriesOutcome};

use crate::snapshot::{
    as_metric_type_blueprint, metrics_for_type, AssembledDocument, Assembler, MetricBlueprint,
    MetricTypeBlueprint,
};
use crate::store::{SeriesStore, StoreError, StoreResult, TagFilter, TimeRange};
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

const MODULE_TAG: &str = "module";
const MODULE_INVENTORY: &str = "inventory";
const FEED_TAG: &str = "feed";
const TYPE_TAG: &str = "type";
const TYPE_METRIC_TYPE: &str = "mt";
const TYPE_RESOURCE: &str = "r";
const MTYPES_TAG: &str = "mtypes";
const MTYPES_DELIMITER: char = '|';

/// Configuration for discovery runs
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum number of series processed at once
    pub concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Pack metric type ids into an `mtypes` tag value
///
/// ```
/// assert_eq!(strata::discovery::encode_mtypes(["heap", "gc"]), "|heap|gc|");
/// ```
pub fn encode_mtypes<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut encoded = String::from(MTYPES_DELIMITER);
    for id in ids {
        encoded.push_str(id.as_ref());
        encoded.push(MTYPES_DELIMITER);
    }
    encoded
}

fn feed_filter(feed: &str) -> TagFilter {
    TagFilter::new()
        .eq(MODULE_TAG, MODULE_INVENTORY)
        .eq(FEED_TAG, feed)
}

fn metric_type_filter(feed: &str) -> TagFilter {
    feed_filter(feed).eq(TYPE_TAG, TYPE_METRIC_TYPE)
}

/// Resources whose `mtypes` holds `|id|`; a bare substring would let `db1` match `db10`
fn resource_filter(feed: &str, metric_type_id: &str) -> StoreResult<TagFilter> {
    let needle = format!("{d}{}{d}", metric_type_id, d = MTYPES_DELIMITER);
    feed_filter(feed)
        .eq(TYPE_TAG, TYPE_RESOURCE)
        .matches(MTYPES_TAG, &format!(".*{}.*", regex::escape(&needle)))
}

/// Locates and reassembles the inventory series of feeds
pub struct SeriesDiscovery {
    store: Arc<dyn SeriesStore>,
    assembler: Assembler,
    config: DiscoveryConfig,
}

impl SeriesDiscovery {
    pub fn new(store: Arc<dyn SeriesStore>, config: DiscoveryConfig) -> Self {
        Self {
            store,
            assembler: Assembler::default(),
            config,
        }
    }

    /// Use an assembler with custom limits
    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Tenants holding at least one inventory series for the feed
    ///
    /// Only checks that such a series exists; no content is fetched.
    pub async fn tenants_with_feed(&self, feed: &str) -> StoreResult<Vec<String>> {
        let filter = feed_filter(feed);
        let tenants = self.store.list_tenants().await?;

        let checked: Vec<(String, bool)> = stream::iter(tenants)
            .map(|tenant| {
                let filter = &filter;
                async move {
                    let found = self.store.find_series(&tenant, filter).await?;
                    Ok::<_, StoreError>((tenant, !found.is_empty()))
                }
            })
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        let tenants: Vec<String> = checked
            .into_iter()
            .filter_map(|(tenant, has_feed)| has_feed.then_some(tenant))
            .collect();

        tracing::debug!(feed, tenants = tenants.len(), "Resolved tenants for feed");
        Ok(tenants)
    }

    /// Metric type blueprints of a feed, one outcome per `type=mt` series
    ///
    /// A series whose root is not a metric type yields no item.
    pub async fn metric_type_series(
        &self,
        tenant: &str,
        feed: &str,
        as_of: i64,
    ) -> StoreResult<DiscoveryReport<MetricTypeBlueprint>> {
        let span = tracing::info_span!("discovery", run_id = %Uuid::new_v4(), tenant, feed, kind = "metric_types");

        async move {
            let outcomes = self.stream_metric_types(tenant, feed, as_of).await?;
            let report: DiscoveryReport<_> = outcomes.collect::<Vec<_>>().await.into_iter().collect();
            log_report(&report);
            Ok::<_, StoreError>(report)
        }
        .instrument(span)
        .await
    }

    /// Metric blueprints of a given metric type, across the feed's resources
    pub async fn resource_series_for_type(
        &self,
        tenant: &str,
        feed: &str,
        metric_type_id: &str,
        as_of: i64,
    ) -> StoreResult<DiscoveryReport<MetricBlueprint>> {
        let span = tracing::info_span!(
            "discovery",
            run_id = %Uuid::new_v4(),
            tenant,
            feed,
            metric_type_id,
            kind = "metrics"
        );

        async move {
            let outcomes = self
                .stream_metrics_for_type(tenant, feed, metric_type_id, as_of)
                .await?;
            let report: DiscoveryReport<_> = outcomes.collect::<Vec<_>>().await.into_iter().collect();
            log_report(&report);
            Ok::<_, StoreError>(report)
        }
        .instrument(span)
        .await
    }

    /// Same as [`Self::metric_type_series`], yielding outcomes as they complete
    pub async fn stream_metric_types<'a>(
        &'a self,
        tenant: &'a str,
        feed: &str,
        as_of: i64,
    ) -> StoreResult<BoxStream<'a, SeriesOutcome<MetricTypeBlueprint>>> {
        let candidates = self
            .store
            .find_series(tenant, &metric_type_filter(feed))
            .await?;
        tracing::debug!(tenant, feed, candidates = candidates.len(), "Found metric type series");

        Ok(stream::iter(candidates)
            .map(move |series| self.metric_type_outcome(tenant, series.id, as_of))
            .buffer_unordered(self.concurrency())
            .boxed())
    }

    /// Same as [`Self::resource_series_for_type`], yielding outcomes as they complete
    pub async fn stream_metrics_for_type<'a>(
        &'a self,
        tenant: &'a str,
        feed: &str,
        metric_type_id: &'a str,
        as_of: i64,
    ) -> StoreResult<BoxStream<'a, SeriesOutcome<MetricBlueprint>>> {
        let filter = resource_filter(feed, metric_type_id)?;
        let candidates = self.store.find_series(tenant, &filter).await?;
        tracing::debug!(
            tenant,
            feed,
            metric_type_id,
            candidates = candidates.len(),
            "Found resource series"
        );

        Ok(stream::iter(candidates)
            .map(move |series| self.metrics_outcome(tenant, series.id, metric_type_id, as_of))
            .buffer_unordered(self.concurrency())
            .boxed())
    }

    async fn metric_type_outcome(
        &self,
        tenant: &str,
        series_id: String,
        as_of: i64,
    ) -> SeriesOutcome<MetricTypeBlueprint> {
        match self.load_document(tenant, &series_id, as_of).await {
            Ok(doc) => SeriesOutcome::Found {
                items: as_metric_type_blueprint(&doc).cloned().into_iter().collect(),
                series_id,
            },
            Err(error) => {
                tracing::warn!(tenant, series_id = %series_id, error = %error, "Metric type series failed");
                SeriesOutcome::Failed(SeriesFailure::new(series_id, error))
            }
        }
    }

    async fn metrics_outcome(
        &self,
        tenant: &str,
        series_id: String,
        metric_type_id: &str,
        as_of: i64,
    ) -> SeriesOutcome<MetricBlueprint> {
        match self.load_document(tenant, &series_id, as_of).await {
            Ok(doc) => SeriesOutcome::Found {
                items: metrics_for_type(&doc, metric_type_id)
                    .into_iter()
                    .cloned()
                    .collect(),
                series_id,
            },
            Err(error) => {
                tracing::warn!(
                    tenant,
                    series_id = %series_id,
                    metric_type_id,
                    error = %error,
                    "Resource series failed"
                );
                SeriesOutcome::Failed(
                    SeriesFailure::new(series_id, error).with_metric_type(metric_type_id),
                )
            }
        }
    }

    /// Fetch the history of one series and reassemble its latest snapshot
    async fn load_document(
        &self,
        tenant: &str,
        series_id: &str,
        as_of: i64,
    ) -> Result<AssembledDocument, SeriesError> {
        let points = self
            .store
            .fetch_points(tenant, series_id, TimeRange::until(as_of))
            .await?;
        let doc = self.assembler.assemble(&points)?;

        tracing::trace!(
            series_id,
            points = points.len(),
            entities = doc.entity_count(),
            "Loaded snapshot"
        );
        Ok(doc)
    }
}

fn log_report<T>(report: &DiscoveryReport<T>) {
    let failed = report.failures().count();
    tracing::info!(
        series = report.series.len(),
        items = report.items().count(),
        failed,
        "Discovery run completed"
    );
}
