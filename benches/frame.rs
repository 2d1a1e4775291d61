//! Whole-frame benchmarks: update plus software rasterisation for each
//! gallery experiment at a typical window size.
//!
//! Run with: `cargo bench --bench frame`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use sketchbook::gallery::{self, GallerySettings};
use sketchbook::Stage;

fn bench_experiments(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_1280x720");
    group.sample_size(30);

    for experiment in gallery::catalog() {
        let settings = GallerySettings { seed: 1, count: None };
        let mut stage = match Stage::new(1280, 720, experiment.build(&settings)) {
            Ok(stage) => stage,
            Err(e) => panic!("cannot mount {}: {}", experiment.id, e),
        };
        // Let bursts and trails populate before measuring.
        for _ in 0..60 {
            stage.frame();
        }
        group.bench_function(BenchmarkId::from_parameter(experiment.id), |b| {
            b.iter(|| stage.frame())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_experiments);
criterion_main!(benches);
