//! Per-series failure types

use crate::snapshot::SnapshotError;
use crate::store::StoreError;
use thiserror::Error;

/// What went wrong while processing one series
#[derive(Error, Debug)]
pub enum SeriesError {
    /// Fetching the series history failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The fetched history could not be reassembled
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// A series that could not be processed, with its identifying context
#[derive(Error, Debug)]
#[error("series {series_id}{}: {error}", metric_type_context(.metric_type_id))]
pub struct SeriesFailure {
    pub series_id: String,
    /// Metric type being resolved, for metric-type-scoped lookups
    pub metric_type_id: Option<String>,
    #[source]
    pub error: SeriesError,
}

fn metric_type_context(metric_type_id: &Option<String>) -> String {
    match metric_type_id {
        Some(id) => format!(" (metric type {})", id),
        None => String::new(),
    }
}

impl SeriesFailure {
    pub fn new(series_id: impl Into<String>, error: impl Into<SeriesError>) -> Self {
        Self {
            series_id: series_id.into(),
            metric_type_id: None,
            error: error.into(),
        }
    }

    /// Attach the metric type being resolved
    pub fn with_metric_type(mut self, metric_type_id: impl Into<String>) -> Self {
        self.metric_type_id = Some(metric_type_id.into());
        self
    }

    /// True when the failure comes from the snapshot content, not the store
    pub fn is_snapshot_error(&self) -> bool {
        matches!(self.error, SeriesError::Snapshot(_))
    }
}
