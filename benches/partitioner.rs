use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parallel_lists::{ListPartitioner, WorkerPool};
use rand::Rng;
use rayon::prelude::*;

const THREADS: usize = 4;

fn random_list(len: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(0..1_000_000)).collect()
}

fn bench_map(c: &mut Criterion) {
    let pool = Arc::new(WorkerPool::new(THREADS).expect("pool"));
    let pooled = ListPartitioner::with_pool(pool);
    let threaded = ListPartitioner::threaded();

    let mut group = c.benchmark_group("map");
    for len in [1_000usize, 100_000] {
        let data = random_list(len);

        group.bench_with_input(BenchmarkId::new("pool", len), &data, |b, data| {
            b.iter(|| pooled.map(THREADS, data, |x| x.wrapping_mul(31) ^ 7).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("scoped_threads", len), &data, |b, data| {
            b.iter(|| threaded.map(THREADS, data, |x| x.wrapping_mul(31) ^ 7).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("rayon", len), &data, |b, data| {
            b.iter(|| {
                data.par_iter()
                    .map(|x| x.wrapping_mul(31) ^ 7)
                    .collect::<Vec<u64>>()
            })
        });
    }
    group.finish();
}

fn bench_minimum(c: &mut Criterion) {
    let pool = Arc::new(WorkerPool::new(THREADS).expect("pool"));
    let pooled = ListPartitioner::with_pool(pool);
    let threaded = ListPartitioner::threaded();
    let data = random_list(100_000);

    let mut group = c.benchmark_group("minimum");
    group.bench_function("pool", |b| {
        b.iter(|| pooled.minimum(THREADS, black_box(&data), |a, b| a.cmp(b)).unwrap())
    });
    group.bench_function("scoped_threads", |b| {
        b.iter(|| threaded.minimum(THREADS, black_box(&data), |a, b| a.cmp(b)).unwrap())
    });
    group.bench_function("rayon", |b| b.iter(|| black_box(&data).par_iter().min().copied()));
    group.finish();
}

fn bench_submit_batch(c: &mut Criterion) {
    let pool = WorkerPool::new(THREADS).expect("pool");

    c.bench_function("submit_batch_1000", |b| {
        b.iter(|| {
            pool.submit_batch(|x: u64| x * x, (0..1000).collect())
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_map, bench_minimum, bench_submit_batch);
criterion_main!(benches);
