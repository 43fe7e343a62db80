//! Criterion benchmarks: pooled recycle vs. fresh heap allocation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use dynpool::{MultiPool, SinglePool};

fn bench_single_pool(c: &mut Criterion) {
    let sizes: Vec<usize> = vec![512, 4096, 65_536];

    let mut group = c.benchmark_group("SinglePool");
    for &size in &sizes {
        let pool = SinglePool::new(size).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut block = pool.acquire().unwrap();
                block[0] = 1;
                black_box(&block);
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("HeapVec");
    for &size in &sizes {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut buf = vec![0u8; size];
                buf[0] = 1;
                black_box(&buf);
            });
        });
    }
    group.finish();
}

fn bench_multipool(c: &mut Criterion) {
    let multipool = MultiPool::new().unwrap();
    let mut group = c.benchmark_group("MultiPool");
    for &size in &[100usize, 3000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(multipool.acquire(size).unwrap()));
        });
    }
    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let pool = SinglePool::new(4096).unwrap();
    c.bench_function("SinglePool/4 threads x 1000", |b| {
        b.iter(|| {
            std::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        for _ in 0..1_000 {
                            black_box(pool.acquire().unwrap());
                        }
                    });
                }
            });
        });
    });
}

criterion_group!(benches, bench_single_pool, bench_multipool, bench_contended);
criterion_main!(benches);
