//! Measures the per-call overhead of checkpoint sampling and the cost of
//! a flush, to keep instrumentation cheap relative to the steps it times.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cronista::cache::PairingCache;
use cronista::store::LogStore;

fn bench_sample_pair(c: &mut Criterion) {
    c.bench_function("sample_start_end_pair", |b| {
        let mut cache = PairingCache::new();
        b.iter(|| {
            cache.sample_start(black_box("step"), black_box("inst-bench"));
            cache.sample_end(black_box("step"), black_box("inst-bench"));
        });
    });
}

fn bench_flush_100_pairs(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let store = LogStore::new();
    c.bench_function("flush_100_pairs", |b| {
        let mut iteration = 0u64;
        b.iter(|| {
            let mut cache = PairingCache::new();
            for i in 0..100 {
                let step = format!("step-{}", i % 10);
                cache.sample_start(&step, "inst-bench");
                cache.sample_end(&step, "inst-bench");
            }
            let path = dir.path().join(format!("log-{iteration}.txt"));
            iteration += 1;
            cache.flush(&store, &path, "bench", true);
        });
    });
}

criterion_group!(benches, bench_sample_pair, bench_flush_100_pairs);
criterion_main!(benches);
