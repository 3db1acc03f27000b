//! Performance benchmark for the consistent trace selector.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trace_sampling_core::sampling::selector;

fn bench_keep(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_keep");
    for rate in [0.0, 0.1, 0.5, 0.9, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(rate), &rate, |b, &rate| {
            let mut trace_id = 0xDEAD_BEEF_0000_0001u64;
            b.iter(|| {
                trace_id = trace_id.wrapping_add(1);
                black_box(selector::keep(black_box(trace_id), black_box(rate)))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_keep);
criterion_main!(benches);
