//! Criterion benchmarks for stgraph-dtw: banded alignment of daily profiles.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use stgraph_dtw::Dtw;

fn make_profile(n: usize, phase: f64) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.05 + phase).sin()).collect()
}

fn bench_dtw_align(c: &mut Criterion) {
    let lengths = [96usize, 288];
    let radii: &[(Option<usize>, &str)] = &[
        (None, "unconstrained"),
        (Some(6), "band_r6"),
        (Some(24), "band_r24"),
    ];

    let mut group = c.benchmark_group("dtw_align");

    for &len in &lengths {
        for &(radius, label) in radii {
            let id = BenchmarkId::new(format!("len{len}"), label);
            let a = make_profile(len, 0.0);
            let b = make_profile(len, 0.7);
            let dtw = match radius {
                None => Dtw::unconstrained(),
                Some(r) => Dtw::with_sakoe_chiba(r),
            };

            group.bench_with_input(id, &(a, b, dtw), |bencher, (a, b, dtw)| {
                bencher.iter(|| dtw.align(a, b).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_dtw_align);
criterion_main!(benches);
