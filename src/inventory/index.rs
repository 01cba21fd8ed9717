//! Inventory Index - read-side view of resources, metrics and types
//!
//! Writers stage entities with `add_*`. Nothing they add is visible until
//! `rebuild_indices()` derives a fresh `IndexSnapshot` from everything
//! staged so far and swaps it in:
//!
//! ```text
//!   add_resource ─┐
//!   add_metric ───┼─► staging (append-only) ──rebuild──► IndexSnapshot ──swap──► readers
//!   add_resource_type ┘
//! ```
//!
//! A reader holds one `Arc<IndexSnapshot>` for the length of a query, so it
//! sees either the previous or the new generation, never a mix.
//!
//! Within a snapshot, duplicate ids resolve to the last staged value and
//! keep the position of their first insertion in every grouping.

use crate::inventory::error::{InventoryError, InventoryResult};
use crate::inventory::types::{
    InventoryDump, Metric, Resource, ResourceNode, ResourceTree, ResourceType,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Root id marking a top-level resource
const TOP_LEVEL: &str = "";

#[derive(Debug, Default)]
struct Staging {
    resources: Vec<Resource>,
    metrics: Vec<Metric>,
    resource_types: Vec<ResourceType>,
}

/// Index statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub resources: usize,
    pub top_level_resources: usize,
    pub metrics: usize,
    pub resource_types: usize,
    pub generation: u64,
}

/// Ids in first-insertion order with the last value staged for each
struct Deduped<T> {
    order: Vec<String>,
    by_id: HashMap<String, T>,
}

fn dedup<T: Clone>(items: &[T], id_of: impl Fn(&T) -> &str) -> Deduped<T> {
    let mut order = Vec::new();
    let mut by_id = HashMap::with_capacity(items.len());

    for item in items {
        let id = id_of(item);
        if by_id.insert(id.to_string(), item.clone()).is_none() {
            order.push(id.to_string());
        }
    }

    Deduped { order, by_id }
}

/// One immutable generation of derived lookup structures
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    generation: u64,
    resources_by_id: HashMap<String, Resource>,
    resources_by_root: HashMap<String, Vec<String>>,
    resources_by_type: HashMap<String, Vec<String>>,
    metrics_by_id: HashMap<String, Metric>,
    resource_types_by_id: HashMap<String, ResourceType>,
    resource_type_order: Vec<String>,
}

impl IndexSnapshot {
    fn build(staging: &Staging, generation: u64) -> Self {
        let resources = dedup(&staging.resources, |r| r.id.as_str());
        let metrics = dedup(&staging.metrics, |m| m.id.as_str());
        let types = dedup(&staging.resource_types, |t| t.id.as_str());

        let mut resources_by_root: HashMap<String, Vec<String>> = HashMap::new();
        let mut resources_by_type: HashMap<String, Vec<String>> = HashMap::new();
        for id in &resources.order {
            if let Some(resource) = resources.by_id.get(id) {
                resources_by_root
                    .entry(resource.root_id.clone())
                    .or_default()
                    .push(id.clone());
                resources_by_type
                    .entry(resource.type_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }

        Self {
            generation,
            resources_by_id: resources.by_id,
            resources_by_root,
            resources_by_type,
            metrics_by_id: metrics.by_id,
            resource_types_by_id: types.by_id,
            resource_type_order: types.order,
        }
    }

    /// Number of rebuilds that produced this snapshot; 0 before the first
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn resolve_resources<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a Resource> {
        ids.iter().filter_map(|id| self.resources_by_id.get(id))
    }

    pub fn find_resource_by_id(&self, id: &str) -> Option<&Resource> {
        self.resources_by_id.get(id)
    }

    pub fn resources_by_root(&self, root_id: &str) -> Vec<&Resource> {
        self.resources_by_root
            .get(root_id)
            .map(|ids| self.resolve_resources(ids).collect())
            .unwrap_or_default()
    }

    pub fn get_all_top_resources(&self) -> Vec<&Resource> {
        self.resources_by_root(TOP_LEVEL)
    }

    pub fn get_resources_by_type(&self, type_id: &str) -> Vec<&Resource> {
        self.resources_by_type
            .get(type_id)
            .map(|ids| self.resolve_resources(ids).collect())
            .unwrap_or_default()
    }

    pub fn get_all_resource_types(&self) -> Vec<&ResourceType> {
        self.resource_type_order
            .iter()
            .filter_map(|id| self.resource_types_by_id.get(id))
            .collect()
    }

    pub fn get_resource_type(&self, type_id: &str) -> Option<&ResourceType> {
        self.resource_types_by_id.get(type_id)
    }

    /// Children of a resource; `None` if the resource itself is unknown
    pub fn get_child_resources(&self, id: &str) -> Option<Vec<&Resource>> {
        let parent = self.resources_by_id.get(id)?;
        Some(self.resolve_resources(&parent.child_ids).collect())
    }

    /// Metrics of a resource; `None` if the resource itself is unknown
    pub fn get_resource_metrics(&self, id: &str) -> Option<Vec<&Metric>> {
        let parent = self.resources_by_id.get(id)?;
        Some(
            parent
                .metric_ids
                .iter()
                .filter_map(|metric_id| self.metrics_by_id.get(metric_id))
                .collect(),
        )
    }

    /// Resolve the whole subtree below `root`
    ///
    /// Fails with `CycleDetected` when a resource is reached again from one
    /// of its own descendants. A resource shared by two branches is loaded
    /// once per branch. The walk keeps its own stack, so chain depth is
    /// bounded by memory only.
    pub fn load_subtree(&self, root: &Resource) -> InventoryResult<ResourceTree> {
        let mut nodes = vec![self.tree_node(root, None, 0)];
        let mut path = HashSet::from([root.id.as_str()]);
        let mut stack = vec![WalkFrame {
            node: 0,
            id: root.id.as_str(),
            children: root.child_ids.iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let next = frame
                .children
                .by_ref()
                .find_map(|id| self.resources_by_id.get(id));

            let Some(child) = next else {
                path.remove(frame.id);
                stack.pop();
                continue;
            };

            if !path.insert(child.id.as_str()) {
                tracing::warn!(id = %child.id, "Cycle detected in inventory tree");
                return Err(InventoryError::CycleDetected {
                    id: child.id.clone(),
                });
            }

            let parent = frame.node;
            let position = nodes.len();
            nodes.push(self.tree_node(child, Some(parent), stack.len()));
            nodes[parent].children.push(position);
            stack.push(WalkFrame {
                node: position,
                id: child.id.as_str(),
                children: child.child_ids.iter(),
            });
        }

        Ok(ResourceTree { nodes })
    }

    fn tree_node(&self, resource: &Resource, parent: Option<usize>, depth: usize) -> ResourceNode {
        let metrics = resource
            .metric_ids
            .iter()
            .filter_map(|id| self.metrics_by_id.get(id).cloned())
            .collect();

        ResourceNode {
            resource: resource.clone(),
            metrics,
            parent,
            children: Vec::new(),
            depth,
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            resources: self.resources_by_id.len(),
            top_level_resources: self
                .resources_by_root
                .get(TOP_LEVEL)
                .map(Vec::len)
                .unwrap_or(0),
            metrics: self.metrics_by_id.len(),
            resource_types: self.resource_types_by_id.len(),
            generation: self.generation,
        }
    }
}

/// A resource on the current walk path and its unvisited child ids
struct WalkFrame<'a> {
    node: usize,
    id: &'a str,
    children: std::slice::Iter<'a, String>,
}

/// Staged inventory plus its latest derived snapshot
#[derive(Debug, Default)]
pub struct InventoryIndex {
    staging: RwLock<Staging>,
    current: RwLock<Arc<IndexSnapshot>>,
    rebuild: Mutex<()>,
}

impl InventoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage(&self, f: impl FnOnce(&mut Staging)) -> InventoryResult<()> {
        let mut staging = self
            .staging
            .write()
            .map_err(|e| InventoryError::Lock(format!("staging lock poisoned: {}", e)))?;
        f(&mut staging);
        Ok(())
    }

    pub fn add_resource(&self, resource: Resource) -> InventoryResult<()> {
        self.stage(|s| s.resources.push(resource))
    }

    pub fn add_metric(&self, metric: Metric) -> InventoryResult<()> {
        self.stage(|s| s.metrics.push(metric))
    }

    pub fn add_resource_type(&self, resource_type: ResourceType) -> InventoryResult<()> {
        self.stage(|s| s.resource_types.push(resource_type))
    }

    /// Stage the whole content of a dump
    pub fn ingest(&self, dump: InventoryDump) -> InventoryResult<()> {
        self.stage(|s| {
            s.resources.extend(dump.resources);
            s.metrics.extend(dump.metrics);
            s.resource_types.extend(dump.resource_types);
        })
    }

    /// Recompute every lookup structure from the staged entities and publish it
    pub fn rebuild_indices(&self) -> InventoryResult<u64> {
        let _rebuilding = self
            .rebuild
            .lock()
            .map_err(|e| InventoryError::Lock(format!("rebuild lock poisoned: {}", e)))?;

        let generation = self.snapshot().generation + 1;
        let snapshot = {
            let staging = self
                .staging
                .read()
                .map_err(|e| InventoryError::Lock(format!("staging lock poisoned: {}", e)))?;
            IndexSnapshot::build(&staging, generation)
        };
        let stats = snapshot.stats();

        *self
            .current
            .write()
            .map_err(|e| InventoryError::Lock(format!("snapshot lock poisoned: {}", e)))? =
            Arc::new(snapshot);

        tracing::debug!(
            generation,
            resources = stats.resources,
            metrics = stats.metrics,
            resource_types = stats.resource_types,
            "Rebuilt inventory indices"
        );
        Ok(generation)
    }

    /// Current snapshot, for several queries against one generation
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        // A poisoned guard still holds a whole snapshot
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot().stats()
    }

    pub fn find_resource_by_id(&self, id: &str) -> Option<Resource> {
        self.snapshot().find_resource_by_id(id).cloned()
    }

    pub fn get_all_top_resources(&self) -> Vec<Resource> {
        cloned(self.snapshot().get_all_top_resources())
    }

    pub fn resources_by_root(&self, root_id: &str) -> Vec<Resource> {
        cloned(self.snapshot().resources_by_root(root_id))
    }

    pub fn get_all_resource_types(&self) -> Vec<ResourceType> {
        cloned(self.snapshot().get_all_resource_types())
    }

    /// Resources of a type; empty if the type is unknown
    pub fn get_resources_by_type(&self, type_id: &str) -> Vec<Resource> {
        cloned(self.snapshot().get_resources_by_type(type_id))
    }

    pub fn get_child_resources(&self, id: &str) -> Option<Vec<Resource>> {
        self.snapshot().get_child_resources(id).map(cloned)
    }

    pub fn get_resource_metrics(&self, id: &str) -> Option<Vec<Metric>> {
        self.snapshot().get_resource_metrics(id).map(cloned)
    }

    pub fn get_resource_type(&self, type_id: &str) -> Option<ResourceType> {
        self.snapshot().get_resource_type(type_id).cloned()
    }

    pub fn load_subtree(&self, root: &Resource) -> InventoryResult<ResourceTree> {
        self.snapshot().load_subtree(root)
    }

    /// Resolve `id` and load its subtree; `Ok(None)` if the id is unknown
    pub fn load_subtree_by_id(&self, id: &str) -> InventoryResult<Option<ResourceTree>> {
        let snapshot = self.snapshot();
        match snapshot.find_resource_by_id(id) {
            Some(root) => snapshot.load_subtree(root).map(Some),
            None => Ok(None),
        }
    }
}

fn cloned<T: Clone>(items: Vec<&T>) -> Vec<T> {
    items.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::types::Operation;
    use crate::snapshot::MetricUnit;
    use std::thread;

    fn ids(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(|r| r.id.as_str()).collect()
    }

    fn eap_index() -> InventoryIndex {
        let index = InventoryIndex::new();

        index
            .add_resource(
                Resource::new("EAP-1", "EAP-1", "EAP")
                    .child("child-1")
                    .child("child-2")
                    .metric("m-1")
                    .metric("m-2"),
            )
            .unwrap();
        index
            .add_resource(
                Resource::new("EAP-2", "EAP-2", "EAP")
                    .child("child-3")
                    .child("child-4")
                    .metric("m-3")
                    .metric("m-4"),
            )
            .unwrap();
        for (id, name, type_id, root) in [
            ("child-1", "Child 1", "FOO", "EAP-1"),
            ("child-2", "Child 2", "BAR", "EAP-1"),
            ("child-3", "Child 3", "FOO", "EAP-2"),
            ("child-4", "Child 4", "BAR", "EAP-2"),
        ] {
            index
                .add_resource(Resource::new(id, name, type_id).root(root))
                .unwrap();
        }

        index
            .add_resource_type(
                ResourceType::new("EAP")
                    .operation(Operation::new("Reload"))
                    .operation(Operation::new("Shutdown")),
            )
            .unwrap();
        index.add_resource_type(ResourceType::new("FOO")).unwrap();
        index.add_resource_type(ResourceType::new("BAR")).unwrap();

        for (id, metric_type, name, unit) in [
            ("m-1", "memory", "Memory", MetricUnit::Bytes),
            ("m-2", "gc", "GC", MetricUnit::None),
            ("m-3", "memory", "Memory", MetricUnit::Bytes),
            ("m-4", "gc", "GC", MetricUnit::None),
        ] {
            index
                .add_metric(Metric::new(id, metric_type, name, unit, 10))
                .unwrap();
        }

        index.rebuild_indices().unwrap();
        index
    }

    #[test]
    fn test_top_resources() {
        let index = eap_index();
        assert_eq!(ids(&index.get_all_top_resources()), vec!["EAP-1", "EAP-2"]);
    }

    #[test]
    fn test_resources_by_type() {
        let index = eap_index();

        assert_eq!(ids(&index.get_resources_by_type("FOO")), vec!["child-1", "child-3"]);
        assert!(index.get_resources_by_type("nada").is_empty());
        assert_eq!(ids(&index.resources_by_root("EAP-2")), vec!["child-3", "child-4"]);
    }

    #[test]
    fn test_resource_metrics_and_children() {
        let index = eap_index();

        let metrics = index.get_resource_metrics("EAP-1").unwrap();
        assert_eq!(
            metrics.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m-1", "m-2"]
        );

        assert_eq!(index.get_child_resources("child-1"), Some(vec![]));
        assert_eq!(ids(&index.get_child_resources("EAP-2").unwrap()), vec!["child-3", "child-4"]);
        assert!(index.get_child_resources("nada").is_none());
        assert!(index.get_resource_metrics("nada").is_none());
    }

    #[test]
    fn test_find_by_id() {
        let index = eap_index();

        assert!(index.find_resource_by_id("nada").is_none());
        assert_eq!(index.find_resource_by_id("child-2").unwrap().name, "Child 2");
    }

    #[test]
    fn test_resource_types() {
        let index = eap_index();

        let types: Vec<String> = index
            .get_all_resource_types()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(types, vec!["EAP", "FOO", "BAR"]);
        assert_eq!(index.get_resource_type("EAP").unwrap().operations.len(), 2);
        assert!(index.get_resource_type("nada").is_none());
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let index = InventoryIndex::new();
        index
            .add_resource(Resource::new("r", "R", "T").child("ghost").child("c").metric("gone"))
            .unwrap();
        index.add_resource(Resource::new("c", "C", "T").root("r")).unwrap();
        index.rebuild_indices().unwrap();

        assert_eq!(ids(&index.get_child_resources("r").unwrap()), vec!["c"]);
        assert_eq!(index.get_resource_metrics("r"), Some(vec![]));

        let tree = index.load_subtree_by_id("r").unwrap().unwrap();
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn test_staged_entities_invisible_until_rebuild() {
        let index = InventoryIndex::new();
        assert_eq!(index.generation(), 0);

        index.add_resource(Resource::new("a", "A", "T")).unwrap();
        assert!(index.find_resource_by_id("a").is_none());
        assert!(index.get_all_top_resources().is_empty());

        assert_eq!(index.rebuild_indices().unwrap(), 1);
        assert!(index.find_resource_by_id("a").is_some());

        index.add_resource(Resource::new("b", "B", "T")).unwrap();
        assert!(index.find_resource_by_id("b").is_none());
        index.rebuild_indices().unwrap();
        assert_eq!(ids(&index.get_all_top_resources()), vec!["a", "b"]);
        assert_eq!(index.generation(), 2);
    }

    #[test]
    fn test_last_write_wins() {
        let index = InventoryIndex::new();
        index.add_resource(Resource::new("a", "first", "T1")).unwrap();
        index.add_resource(Resource::new("b", "B", "T1")).unwrap();
        index.add_resource(Resource::new("a", "second", "T1")).unwrap();
        index.rebuild_indices().unwrap();

        assert_eq!(index.find_resource_by_id("a").unwrap().name, "second");

        let by_type = index.get_resources_by_type("T1");
        assert_eq!(ids(&by_type), vec!["a", "b"]);
        assert_eq!(by_type[0].name, "second");
        assert_eq!(index.stats().resources, 2);
    }

    #[test]
    fn test_rewrite_moves_resource_between_groups() {
        let index = InventoryIndex::new();
        index.add_resource(Resource::new("a", "A", "T1")).unwrap();
        index.add_resource(Resource::new("a", "A", "T2").root("p")).unwrap();
        index.rebuild_indices().unwrap();

        assert!(index.get_resources_by_type("T1").is_empty());
        assert_eq!(ids(&index.get_resources_by_type("T2")), vec!["a"]);
        assert!(index.get_all_top_resources().is_empty());
    }

    #[test]
    fn test_load_subtree() {
        let index = eap_index();

        let tree = index.load_subtree_by_id("EAP-1").unwrap().unwrap();
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.root().metrics.len(), 2);
        assert_eq!(tree.root().children, vec![1, 2]);
        assert_eq!(tree.get(2).unwrap().parent, Some(0));
        assert_eq!(tree.get(2).unwrap().depth, 1);
        assert_eq!(
            tree.resources().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["EAP-1", "child-1", "child-2"]
        );

        assert_eq!(index.load_subtree_by_id("nada").unwrap(), None);
    }

    #[test]
    fn test_cycle_detected() {
        let index = InventoryIndex::new();
        index.add_resource(Resource::new("a", "A", "T").child("b")).unwrap();
        index
            .add_resource(Resource::new("b", "B", "T").root("a").child("c"))
            .unwrap();
        index
            .add_resource(Resource::new("c", "C", "T").root("a").child("a"))
            .unwrap();
        index.rebuild_indices().unwrap();

        let root = index.find_resource_by_id("a").unwrap();
        let err = index.load_subtree(&root).unwrap_err();
        assert_eq!(err, InventoryError::CycleDetected { id: "a".to_string() });
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let index = InventoryIndex::new();
        index.add_resource(Resource::new("a", "A", "T").child("a")).unwrap();
        index.rebuild_indices().unwrap();

        assert!(matches!(
            index.load_subtree_by_id("a"),
            Err(InventoryError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_shared_descendant_is_not_a_cycle() {
        let index = InventoryIndex::new();
        index
            .add_resource(Resource::new("top", "Top", "T").child("left").child("right"))
            .unwrap();
        index
            .add_resource(Resource::new("left", "L", "T").root("top").child("shared"))
            .unwrap();
        index
            .add_resource(Resource::new("right", "R", "T").root("top").child("shared"))
            .unwrap();
        index
            .add_resource(Resource::new("shared", "S", "T").root("top"))
            .unwrap();
        index.rebuild_indices().unwrap();

        let tree = index.load_subtree_by_id("top").unwrap().unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(
            tree.resources().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["top", "left", "shared", "right", "shared"]
        );
    }

    fn chain_index(len: usize, closed: bool) -> InventoryIndex {
        let index = InventoryIndex::new();
        for i in 0..len {
            let next = if i + 1 < len {
                Some(format!("r{}", i + 1))
            } else if closed {
                Some("r0".to_string())
            } else {
                None
            };
            let mut resource = Resource::new(format!("r{}", i), "R", "T");
            if i > 0 {
                resource = resource.root("r0");
            }
            if let Some(next) = next {
                resource = resource.child(next);
            }
            index.add_resource(resource).unwrap();
        }
        index.rebuild_indices().unwrap();
        index
    }

    #[test]
    fn test_deep_chain_loads() {
        let index = chain_index(10_000, false);

        let tree = index.load_subtree_by_id("r0").unwrap().unwrap();
        assert_eq!(tree.size(), 10_000);

        let last = tree.get(9_999).unwrap();
        assert_eq!(last.resource.id, "r9999");
        assert_eq!(last.depth, 9_999);
        assert_eq!(last.parent, Some(9_998));
        assert!(last.children.is_empty());
    }

    #[test]
    fn test_deep_ring_is_a_cycle() {
        let index = chain_index(10_000, true);

        let err = index.load_subtree_by_id("r0").unwrap_err();
        assert_eq!(err, InventoryError::CycleDetected { id: "r0".to_string() });
    }

    #[test]
    fn test_ingest_dump() {
        let dump: InventoryDump = serde_json::from_str(
            r#"{
                "resources": [
                    {"id": "EAP-1", "name": "EAP-1", "typeId": "EAP", "childIds": ["child-1"]},
                    {"id": "child-1", "name": "Child 1", "typeId": "FOO", "rootId": "EAP-1"}
                ],
                "metrics": [{"id": "m-1", "name": "Memory", "type": "memory", "unit": "BYTES"}],
                "resourceTypes": [{"id": "EAP"}]
            }"#,
        )
        .unwrap();

        let index = InventoryIndex::new();
        index.ingest(dump).unwrap();
        index.rebuild_indices().unwrap();

        assert_eq!(ids(&index.get_all_top_resources()), vec!["EAP-1"]);
        assert_eq!(index.stats().metrics, 1);
        assert!(index.get_resource_type("EAP").is_some());
    }

    #[test]
    fn test_stats() {
        let stats = eap_index().stats();

        assert_eq!(
            stats,
            IndexStats {
                resources: 6,
                top_level_resources: 2,
                metrics: 4,
                resource_types: 3,
                generation: 1,
            }
        );
    }

    #[test]
    fn test_readers_see_whole_generations() {
        let index = Arc::new(InventoryIndex::new());
        index.rebuild_indices().unwrap();

        let writer = {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for i in 0..50 {
                    // Each generation adds a parent and its child together
                    index
                        .add_resource(Resource::new(format!("p{}", i), "P", "T").child(format!("c{}", i)))
                        .unwrap();
                    index
                        .add_resource(Resource::new(format!("c{}", i), "C", "T").root(format!("p{}", i)))
                        .unwrap();
                    index.rebuild_indices().unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = index.snapshot();
                        let stats = snapshot.stats();
                        assert_eq!(stats.resources, stats.top_level_resources * 2);
                        for parent in snapshot.get_all_top_resources() {
                            assert_eq!(snapshot.get_child_resources(&parent.id).unwrap().len(), 1);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(index.generation(), 51);
    }
}
