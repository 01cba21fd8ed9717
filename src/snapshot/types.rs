//! Core data types for inventory snapshots
//!
//! This module defines the wire vocabulary shared by the assembler and
//! the extractor:
//! - `DataPoint`: one stored record (a whole payload or one chunk of it)
//! - `AssembledDocument`: a fully reconstructed inventory structure
//! - `EntityBlueprint` and its variants: entity descriptions inside a document

use crate::snapshot::path::RelativePath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag on the master data point holding the number of chunks
pub const CHUNKS_TAG: &str = "chunks";

/// Tag on the master data point holding the total decoded byte length
pub const SIZE_TAG: &str = "size";

/// A single stored record of a string series
///
/// `value` is a base64 payload: either the whole gzip-compressed document
/// or one slice of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataPoint {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Base64-encoded payload
    pub value: String,
    /// Record tags (`chunks` and `size` on a fragmented master)
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl DataPoint {
    /// Create a data point with a specific timestamp
    pub fn new(timestamp: i64, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            value: value.into(),
            tags: HashMap::new(),
        }
    }

    /// Builder method: add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Check if this point has a specific tag value
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tags.get(key).map(|v| v == value).unwrap_or(false)
    }

    /// Whether this point is the master of a fragmented payload
    pub fn is_chunk_master(&self) -> bool {
        self.tags.contains_key(CHUNKS_TAG)
    }
}

/// Unit of a metric or metric type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricUnit {
    #[default]
    None,
    Percentage,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    PerSecond,
}

/// Kind of data a metric type produces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricDataType {
    #[default]
    Gauge,
    Counter,
    Availability,
    String,
}

/// Pre-persistence description of a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBlueprint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource_type_path: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Pre-persistence description of a resource type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeBlueprint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Pre-persistence description of a metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricBlueprint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Canonical path of the metric type, e.g. `/t;tenant/f;feed/mt;heap`
    #[serde(default)]
    pub metric_type_path: Option<String>,
    /// Collection interval override, in seconds
    #[serde(default)]
    pub collection_interval: Option<u64>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Pre-persistence description of a metric type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricTypeBlueprint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: MetricUnit,
    #[serde(default)]
    pub metric_data_type: MetricDataType,
    /// Collection interval, in seconds
    #[serde(default)]
    pub collection_interval: Option<u64>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Any entity found in an inventory document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntityBlueprint {
    Resource(ResourceBlueprint),
    ResourceType(ResourceTypeBlueprint),
    Metric(MetricBlueprint),
    MetricType(MetricTypeBlueprint),
}

impl EntityBlueprint {
    /// Identifier of the wrapped entity
    pub fn id(&self) -> &str {
        match self {
            EntityBlueprint::Resource(bp) => &bp.id,
            EntityBlueprint::ResourceType(bp) => &bp.id,
            EntityBlueprint::Metric(bp) => &bp.id,
            EntityBlueprint::MetricType(bp) => &bp.id,
        }
    }

    /// Short name of the entity kind, as used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            EntityBlueprint::Resource(_) => "resource",
            EntityBlueprint::ResourceType(_) => "resourceType",
            EntityBlueprint::Metric(_) => "metric",
            EntityBlueprint::MetricType(_) => "metricType",
        }
    }
}

impl From<ResourceBlueprint> for EntityBlueprint {
    fn from(bp: ResourceBlueprint) -> Self {
        EntityBlueprint::Resource(bp)
    }
}

impl From<ResourceTypeBlueprint> for EntityBlueprint {
    fn from(bp: ResourceTypeBlueprint) -> Self {
        EntityBlueprint::ResourceType(bp)
    }
}

impl From<MetricBlueprint> for EntityBlueprint {
    fn from(bp: MetricBlueprint) -> Self {
        EntityBlueprint::Metric(bp)
    }
}

impl From<MetricTypeBlueprint> for EntityBlueprint {
    fn from(bp: MetricTypeBlueprint) -> Self {
        EntityBlueprint::MetricType(bp)
    }
}

/// A reconstructed inventory document
///
/// Only ever produced whole by the assembler; there is no partial form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssembledDocument {
    /// Entity at the empty relative path
    pub root: EntityBlueprint,
    /// Relative path → entity, for every entity below the root
    #[serde(default)]
    pub structure: HashMap<String, EntityBlueprint>,
    /// Resource type id → relative paths of resources of that type
    #[serde(default)]
    pub resource_types_index: HashMap<String, Vec<String>>,
    /// Metric type id → relative paths of metrics of that type
    #[serde(default)]
    pub metric_types_index: HashMap<String, Vec<String>>,
}

impl AssembledDocument {
    /// Create a document holding only a root entity
    pub fn new(root: impl Into<EntityBlueprint>) -> Self {
        Self {
            root: root.into(),
            structure: HashMap::new(),
            resource_types_index: HashMap::new(),
            metric_types_index: HashMap::new(),
        }
    }

    /// Builder: add an entity at a relative path
    pub fn child(mut self, path: impl Into<String>, entity: impl Into<EntityBlueprint>) -> Self {
        self.structure.insert(path.into(), entity.into());
        self
    }

    /// Builder: record a path under a metric type in the embedded index
    pub fn index_metric(mut self, metric_type_id: impl Into<String>, path: impl Into<String>) -> Self {
        self.metric_types_index
            .entry(metric_type_id.into())
            .or_default()
            .push(path.into());
        self
    }

    /// Builder: record a path under a resource type in the embedded index
    pub fn index_resource(
        mut self,
        resource_type_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.resource_types_index
            .entry(resource_type_id.into())
            .or_default()
            .push(path.into());
        self
    }

    /// Resolve a relative path to an entity
    ///
    /// The raw key is tried first, then its canonical form. The empty path
    /// resolves to the root.
    pub fn resolve(&self, path: &str) -> Option<&EntityBlueprint> {
        if let Some(entity) = self.structure.get(path) {
            return Some(entity);
        }

        let canonical = RelativePath::parse(path).ok()?;
        if canonical.is_root() {
            return Some(&self.root);
        }
        self.structure.get(&canonical.to_string())
    }

    /// Number of entities, root included
    pub fn entity_count(&self) -> usize {
        self.structure.len() + 1
    }
}
