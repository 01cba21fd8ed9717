//! Core data types for the series store contract

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A series known to the store, with its tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    /// Series identifier, unique within a tenant
    pub id: String,
    /// Series-level tags (`module`, `feed`, `type`, `mtypes`, ...)
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl SeriesInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: HashMap::new(),
        }
    }

    /// Builder method: add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Time range for point fetches (half-open interval: [start, end))
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (exclusive), in milliseconds
    pub end: i64,
}

impl TimeRange {
    /// Everything from the epoch up to and including `as_of`
    pub fn until(as_of: i64) -> Self {
        Self {
            start: 0,
            end: as_of.saturating_add(1),
        }
    }
}
