//! Benchmarks for the neighbour search behind connection lines.
//!
//! Run with: `cargo bench --bench neighbor_search`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use sketchbook::spatial::{all_pairs, SpatialGrid};

fn scattered(count: usize) -> Vec<Vec2> {
    let mut rng = SmallRng::seed_from_u64(7);
    (0..count)
        .map(|_| Vec2::new(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0)))
        .collect()
}

fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_pairs");
    let max_dist = 110.0;

    for count in [140, 500, 2000] {
        let positions = scattered(count);

        group.bench_with_input(BenchmarkId::new("all_pairs", count), &positions, |b, positions| {
            b.iter(|| {
                let mut found = 0usize;
                all_pairs(positions, max_dist, |_, _, _| found += 1);
                black_box(found)
            })
        });

        group.bench_with_input(BenchmarkId::new("grid", count), &positions, |b, positions| {
            let mut grid = SpatialGrid::new(max_dist);
            b.iter(|| {
                grid.rebuild(positions.iter().copied());
                let mut found = 0usize;
                grid.for_each_pair(max_dist, |_, _, _| found += 1);
                black_box(found)
            })
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let positions = scattered(10_000);
    let mut grid = SpatialGrid::new(64.0);
    c.bench_function("grid_rebuild_10k", |b| {
        b.iter(|| {
            grid.rebuild(positions.iter().copied());
            black_box(grid.len())
        })
    });
}

criterion_group!(benches, bench_pairs, bench_rebuild);
criterion_main!(benches);
