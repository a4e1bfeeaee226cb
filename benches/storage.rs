// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for raw store operations.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use vssdb::storage::{CommitPlan, MemoryStore, RocksStore, Store, Value};
use tempfile::TempDir;

const STORE: &str = "bench";

fn create_rocks_store() -> (RocksStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = RocksStore::open(dir.path()).unwrap();
    (store, dir)
}

fn populate<S: Store>(store: &S, count: usize) {
    let mut plan = CommitPlan::new(store.global_version(STORE).unwrap());
    for i in 0..count {
        plan.put(format!("key{:05}", i), 0, Value::new(vec![0u8; 100]));
    }
    store.commit(STORE, plan).unwrap();
}

fn bench_point_read(c: &mut Criterion) {
    let (rocks, _dir) = create_rocks_store();
    let memory = MemoryStore::new();
    populate(&rocks, 10000);
    populate(&memory, 10000);

    let mut group = c.benchmark_group("storage");
    group.throughput(Throughput::Elements(1));

    group.bench_function("rocks_get", |b| {
        b.iter_batched(
            || format!("key{:05}", rand::random::<u32>() % 10000),
            |key| rocks.get(STORE, &key).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("memory_get", |b| {
        b.iter_batched(
            || format!("key{:05}", rand::random::<u32>() % 10000),
            |key| memory.get(STORE, &key).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let (store, _dir) = create_rocks_store();

    let mut group = c.benchmark_group("storage");
    group.throughput(Throughput::Elements(1));

    let counter = std::sync::atomic::AtomicU64::new(0);

    group.bench_function("rocks_commit_1", |b| {
        b.iter(|| {
            let i = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let mut plan = CommitPlan::new(store.global_version(STORE).unwrap());
            plan.put(format!("key{}", i), 1, Value::new(vec![0u8; 100]));
            store.commit(STORE, plan).unwrap()
        })
    });

    group.finish();
}

fn bench_batch_commit(c: &mut Criterion) {
    let (store, _dir) = create_rocks_store();

    let mut group = c.benchmark_group("storage");
    group.throughput(Throughput::Elements(100));

    let counter = std::sync::atomic::AtomicU64::new(0);

    group.bench_function("rocks_commit_100", |b| {
        b.iter(|| {
            let base = counter.fetch_add(100, std::sync::atomic::Ordering::Relaxed);
            let mut plan = CommitPlan::new(store.global_version(STORE).unwrap());
            for i in 0..100 {
                plan.put(format!("key{}", base + i), 1, Value::new(vec![0u8; 100]));
            }
            store.commit(STORE, plan).unwrap()
        })
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let (store, _dir) = create_rocks_store();
    populate(&store, 10000);

    let mut group = c.benchmark_group("storage");

    group.bench_function("scan_100", |b| {
        b.iter(|| store.scan_key_versions(STORE, "key", None, 100).unwrap())
    });

    group.bench_function("scan_1000", |b| {
        b.iter(|| {
            store
                .scan_key_versions(STORE, "key", Some("key05000"), 1000)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_point_read,
    bench_commit,
    bench_batch_commit,
    bench_scan,
);
criterion_main!(benches);
