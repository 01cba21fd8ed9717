//! Inventory entities as served to readers

use crate::snapshot::MetricUnit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A monitored resource
///
/// Parent/child links are plain ids and are only resolved at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub type_id: String,
    /// Id of the top-level ancestor; empty for a top-level resource
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub metric_ids: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            type_id: type_id.into(),
            root_id: String::new(),
            child_ids: Vec::new(),
            metric_ids: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Builder method: set the root id
    pub fn root(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = root_id.into();
        self
    }

    /// Builder method: add a child id
    pub fn child(mut self, id: impl Into<String>) -> Self {
        self.child_ids.push(id.into());
        self
    }

    /// Builder method: add a metric id
    pub fn metric(mut self, id: impl Into<String>) -> Self {
        self.metric_ids.push(id.into());
        self
    }

    /// Builder method: add a property
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.root_id.is_empty()
    }
}

/// A metric attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub name: String,
    /// Metric type id
    #[serde(rename = "type")]
    pub metric_type: String,
    #[serde(default)]
    pub unit: MetricUnit,
    /// Collection interval, in seconds
    #[serde(default)]
    pub interval: u64,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Metric {
    pub fn new(
        id: impl Into<String>,
        metric_type: impl Into<String>,
        name: impl Into<String>,
        unit: MetricUnit,
        interval: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metric_type: metric_type.into(),
            unit,
            interval,
            properties: HashMap::new(),
        }
    }
}

/// An operation that can be invoked on resources of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    /// Parameter name → parameter attributes (`type`, `defaultValue`, ...)
    #[serde(default)]
    pub parameters: HashMap<String, HashMap<String, String>>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl ResourceType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operations: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Builder method: add an operation
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }
}

/// Serialized inventory content, as loaded from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDump {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub resource_types: Vec<ResourceType>,
}

/// One resource of a loaded subtree, with its resolved metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub resource: Resource,
    pub metrics: Vec<Metric>,
    /// Position of the parent in the tree; `None` for the root
    pub parent: Option<usize>,
    /// Positions of the resolved children, in `child_ids` order
    pub children: Vec<usize>,
    /// Distance from the root
    pub depth: usize,
}

/// A loaded subtree, flattened in depth-first preorder
///
/// The root sits at position 0. Nodes refer to each other by position, so
/// dropping, cloning or serializing a tree never recurses however deep it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTree {
    pub(crate) nodes: Vec<ResourceNode>,
}

impl ResourceTree {
    pub fn root(&self) -> &ResourceNode {
        &self.nodes[0]
    }

    /// Number of resources in the tree, the root included
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, position: usize) -> Option<&ResourceNode> {
        self.nodes.get(position)
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    /// Resolved children of the node at `position`
    pub fn children(&self, position: usize) -> impl Iterator<Item = &ResourceNode> {
        self.nodes
            .get(position)
            .into_iter()
            .flat_map(move |node| node.children.iter().map(move |&child| &self.nodes[child]))
    }

    /// Every resource of the tree, depth first
    pub fn resources(&self) -> Vec<&Resource> {
        self.nodes.iter().map(|node| &node.resource).collect()
    }
}
