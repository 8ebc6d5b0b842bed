use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use matchsort::prelude::*;
use rand::Rng;
use std::hint::black_box;
use std::time::Duration;

fn bench_1m_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("1M Rows");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(90)); // Increase time for large sort setup overhead

    // Dataset generation
    let mut rng = rand::rng();
    let count = 1_000_000;

    // Rows are wide enough that moving them costs more than moving indices.
    let order: Vec<u64> = (0..count).map(|_| rng.random()).collect();
    let rows: Vec<[u64; 4]> = (0..count as u64).map(|i| [i, i ^ 1, i ^ 2, i ^ 3]).collect();

    group.throughput(Throughput::Elements(count as u64));

    // Matched sort
    group.bench_function("sort_matched", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut rows| sort_matched(black_box(&mut rows), black_box(&order)),
            BatchSize::LargeInput,
        )
    });

    // Presorted keys take the O(n) path.
    let mut sorted_order = order.clone();
    sorted_order.sort_unstable();
    group.bench_function("sort_matched (presorted)", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut rows| sort_matched(black_box(&mut rows), black_box(&sorted_order)),
            BatchSize::LargeInput,
        )
    });

    // Zip, std stable sort, unzip
    group.bench_function("zip + slice::sort_by_key", |b| {
        b.iter_batched(
            || rows.clone(),
            |rows| {
                let mut pairs: Vec<(u64, [u64; 4])> = order.iter().copied().zip(rows).collect();
                pairs.sort_by_key(|p| p.0);
                pairs.into_iter().map(|(_, r)| r).collect::<Vec<_>>()
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_1m_rows);
criterion_main!(benches);
