//! Criterion benchmarks for stgraph-window: windowed statistics and batch collation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ndarray::{Array2, Array3};
use stgraph_window::{Batcher, SplitDataset, WindowConfig, WindowStats};

fn bench_window_statistics(c: &mut Criterion) {
    let series = Array2::from_shape_fn((8_640, 300), |(t, n)| ((t * 31 + n * 7) % 97) as f64);
    let window = WindowConfig::default();
    c.bench_function("window_statistics_8640x300", |b| {
        b.iter(|| window.compute_window_statistics(black_box(series.view())))
    });
}

fn bench_collate(c: &mut Criterion) {
    let signal = Array3::from_shape_fn((2_000, 300, 3), |(t, n, ch)| (t + n + ch) as f64);
    let stats = WindowStats { mean: 1000.0, std: 250.0 };
    let ds = SplitDataset::new(signal.view(), 0..2_000, 12, 12, stats).expect("valid split");
    let indices: Vec<usize> = (0..64).collect();
    c.bench_function("collate_64x300", |b| b.iter(|| Batcher::collate(&ds, black_box(&indices))));
}

criterion_group!(benches, bench_window_statistics, bench_collate);
criterion_main!(benches);
