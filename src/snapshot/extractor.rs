//! Snapshot Extractor
//!
//! Read-only queries over an assembled document. A shape mismatch is a
//! legitimate "no match", never an error.

use crate::snapshot::types::{
    AssembledDocument, EntityBlueprint, MetricBlueprint, MetricTypeBlueprint, ResourceBlueprint,
};
use std::collections::HashMap;

/// The document root, if it describes a metric type
pub fn as_metric_type_blueprint(doc: &AssembledDocument) -> Option<&MetricTypeBlueprint> {
    match &doc.root {
        EntityBlueprint::MetricType(bp) => Some(bp),
        _ => None,
    }
}

/// Metrics of a metric type, in embedded index order
///
/// The index is a hint: paths that do not resolve, or resolve to something
/// other than a metric, are skipped.
pub fn metrics_for_type<'a>(doc: &'a AssembledDocument, metric_type_id: &str) -> Vec<&'a MetricBlueprint> {
    indexed_entities(doc, &doc.metric_types_index, metric_type_id, |entity| match entity {
        EntityBlueprint::Metric(bp) => Some(bp),
        _ => None,
    })
}

/// Resources of a resource type, in embedded index order
pub fn resources_for_type<'a>(
    doc: &'a AssembledDocument,
    resource_type_id: &str,
) -> Vec<&'a ResourceBlueprint> {
    indexed_entities(doc, &doc.resource_types_index, resource_type_id, |entity| {
        match entity {
            EntityBlueprint::Resource(bp) => Some(bp),
            _ => None,
        }
    })
}

fn indexed_entities<'a, T>(
    doc: &'a AssembledDocument,
    index: &'a HashMap<String, Vec<String>>,
    type_id: &str,
    shape: impl Fn(&'a EntityBlueprint) -> Option<&'a T>,
) -> Vec<&'a T> {
    let Some(paths) = index.get(type_id) else {
        return Vec::new();
    };

    paths
        .iter()
        .filter_map(|path| {
            let Some(entity) = doc.resolve(path) else {
                tracing::debug!(type_id, path = %path, "Indexed path not found in document");
                return None;
            };
            let matched = shape(entity);
            if matched.is_none() {
                tracing::debug!(
                    type_id,
                    path = %path,
                    kind = entity.kind(),
                    "Indexed path has unexpected entity kind"
                );
            }
            matched
        })
        .collect()
}
