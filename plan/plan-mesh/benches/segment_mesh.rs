//! Benchmarks for segment meshing.
//!
//! Run with: cargo bench -p plan-mesh

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use plan_mesh::{compute_segment_mesh, MeshConfig};
use plan_types::{CatalogId, Opening, Point2, SkirtingProfile, WallSegment};

fn plain_wall() -> WallSegment {
    WallSegment::new(Point2::new(0.0, 0.0), Point2::new(8.0, 0.0), 0.2, 2.7)
}

fn busy_wall() -> WallSegment {
    let mut segment = plain_wall().with_skirting(SkirtingProfile::standard());
    segment
        .openings
        .push(Opening::new(CatalogId::new("door"), 0.5, 0.0, 0.9, 2.1));
    for i in 0..4 {
        let offset = 2.0 + 1.4 * f64::from(i);
        segment
            .openings
            .push(Opening::new(CatalogId::new("window"), offset, 0.9, 1.0, 1.2));
    }
    segment
}

fn bench_segment_mesh(c: &mut Criterion) {
    let config = MeshConfig::default();

    let mut group = c.benchmark_group("segment_mesh");
    group.throughput(Throughput::Elements(1));

    group.bench_function("plain_wall", |b| {
        let segment = plain_wall();
        b.iter(|| compute_segment_mesh(black_box(&segment), &config));
    });

    group.bench_function("door_and_four_windows_with_skirting", |b| {
        let segment = busy_wall();
        b.iter(|| compute_segment_mesh(black_box(&segment), &config));
    });

    group.finish();
}

criterion_group!(benches, bench_segment_mesh);
criterion_main!(benches);
