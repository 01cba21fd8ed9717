//! Benchmarks for snapshot reassembly and index rebuilds
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata::inventory::{InventoryIndex, Metric, Resource};
use strata::snapshot::*;

fn create_document(metrics: usize) -> AssembledDocument {
    let mut doc = AssembledDocument::new(ResourceBlueprint {
        id: "eap".to_string(),
        name: Some("EAP".to_string()),
        ..Default::default()
    });

    for i in 0..metrics {
        let path = format!("m;metric-{}", i);
        let metric_type = format!("type-{}", i % 10);
        doc = doc
            .child(
                path.clone(),
                MetricBlueprint {
                    id: format!("metric-{}", i),
                    metric_type_path: Some(format!("/mt;{}", metric_type)),
                    ..Default::default()
                },
            )
            .index_metric(metric_type, path);
    }
    doc
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    for metrics in [10, 1000, 10000] {
        let doc = create_document(metrics);
        let compressed = encode_document(&doc).unwrap();
        group.throughput(Throughput::Bytes(compressed.len() as u64));

        let single = split_payload(&compressed, usize::MAX, 1_000_000);
        group.bench_function(format!("single_{}", metrics), |b| {
            b.iter(|| assemble(black_box(&single)).unwrap())
        });

        let chunked = split_payload(&compressed, 512, 1_000_000);
        group.bench_function(format!("chunked_{}", metrics), |b| {
            b.iter(|| assemble(black_box(&chunked)).unwrap())
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let doc = create_document(10000);

    c.bench_function("metrics_for_type_10000", |b| {
        b.iter(|| metrics_for_type(black_box(&doc), "type-3").len())
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let index = InventoryIndex::new();
    for root in 0..100 {
        let mut parent = Resource::new(format!("root-{}", root), "Root", "SERVER");
        for child in 0..50 {
            let id = format!("child-{}-{}", root, child);
            parent = parent.child(id.clone());
            index
                .add_resource(
                    Resource::new(id.clone(), "Child", "DATASOURCE")
                        .root(format!("root-{}", root))
                        .metric(format!("{}-m", id)),
                )
                .unwrap();
            index
                .add_metric(Metric::new(format!("{}-m", id), "pool", "Pool", MetricUnit::None, 30))
                .unwrap();
        }
        index.add_resource(parent).unwrap();
    }

    c.bench_function("rebuild_5000_resources", |b| {
        b.iter(|| index.rebuild_indices().unwrap())
    });

    index.rebuild_indices().unwrap();
    c.bench_function("load_subtree_50_children", |b| {
        b.iter(|| index.load_subtree_by_id(black_box("root-42")).unwrap())
    });
}

criterion_group!(benches, bench_assemble, bench_extract, bench_rebuild);
criterion_main!(benches);
