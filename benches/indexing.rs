//! Update and lookup benchmarks for the primary index.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use vultus::{IndexConfig, OrdinalIgnoreCase, PrimaryIndex, PropertyIndexer};

const CCYS: [&str; 5] = ["GBP", "EUR", "USD", "JPY", "CHF"];

#[derive(Clone)]
struct Account {
    code: String,
    ccy: String,
    high: bool,
    low: bool,
    tags: Vec<u8>,
}

fn accounts(count: usize, seed: u64) -> Vec<Account> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|i| Account {
            code: format!("A{}", i),
            ccy: CCYS[rng.usize(..CCYS.len())].to_string(),
            high: rng.bool(),
            low: rng.bool(),
            tags: (0..rng.usize(..4)).map(|_| rng.u8(..16)).collect(),
        })
        .collect()
}

fn index_with_indexers(config: IndexConfig) -> PrimaryIndex<String, Account> {
    let index = PrimaryIndex::with_config(|a: &Account| a.code.clone(), config).unwrap();
    index.add_field_index("ccy", |a: &Account| Some(a.ccy.clone())).unwrap();
    index.add_field_index("high", |a: &Account| Some(a.high)).unwrap();
    index.add_multi_value_index("tags", |a: &Account| a.tags.clone()).unwrap();
    index
}

fn bench_bulk_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_update");
    group.sample_size(20);

    for size in [1_000usize, 10_000, 100_000] {
        let data = accounts(size, 7);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter_batched(
                || (index_with_indexers(IndexConfig::default()), data.clone()),
                |(index, batch)| {
                    index.update(batch);
                    index
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_incremental_update(c: &mut Criterion) {
    let index = index_with_indexers(IndexConfig::default());
    index.update(accounts(50_000, 7));
    let delta = accounts(100, 11);

    c.bench_function("incremental_update_100_into_50k", |b| {
        b.iter(|| index.update(black_box(delta.clone())))
    });
}

fn bench_rebuild_threads(c: &mut Criterion) {
    let data = accounts(20_000, 7);
    let mut group = c.benchmark_group("rebuild_threads");
    group.sample_size(20);

    for threads in [1usize, 2, 4] {
        let config = IndexConfig {
            rebuild_threads: threads,
            ..IndexConfig::default()
        };
        let index = index_with_indexers(config);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &data, |b, data| {
            b.iter(|| index.update(data.clone()))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let index = PrimaryIndex::new(|a: &Account| a.code.clone());
    let by_ccy = index.add_field_index("ccy", |a: &Account| Some(a.ccy.clone())).unwrap();
    let by_high = index.add_field_index("high", |a: &Account| Some(a.high)).unwrap();
    let by_low = index.add_field_index("low", |a: &Account| Some(a.low)).unwrap();
    index.update(accounts(100_000, 7));

    let gbp = "GBP".to_string();
    let mut group = c.benchmark_group("lookup");

    group.bench_function("primary_filter", |b| {
        let key = "A4242".to_string();
        b.iter(|| index.filter(black_box(&key)))
    });

    group.bench_function("field_filter", |b| b.iter(|| by_ccy.filter(black_box(&gbp))));

    group.bench_function("intersect_and_resolve", |b| {
        b.iter(|| {
            let ccy = by_ccy.filter(&gbp);
            let high = by_high.filter(&true);
            let low = by_low.filter(&true);
            let keys: Vec<&String> = ccy
                .iter()
                .filter(|k| high.contains(*k) && low.contains(*k))
                .collect();
            index.filter_many(keys)
        })
    });

    group.finish();
}

fn bench_comparer_lookup(c: &mut Criterion) {
    let index = PrimaryIndex::new(|a: &Account| a.code.clone());
    let exact = index.add_field_index("ccy", |a: &Account| Some(a.ccy.clone())).unwrap();
    let folded = index
        .add_field_index_with_comparer("ccy_ci", |a: &Account| Some(a.ccy.clone()), OrdinalIgnoreCase)
        .unwrap();
    index.update(accounts(10_000, 7));

    let upper = "EUR".to_string();
    let mixed = "eUr".to_string();
    let mut group = c.benchmark_group("comparer_lookup");
    group.bench_function("ordinal", |b| b.iter(|| exact.filter(black_box(&upper))));
    group.bench_function("ignore_case", |b| b.iter(|| folded.filter(black_box(&mixed))));
    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_update,
    bench_incremental_update,
    bench_rebuild_threads,
    bench_lookup,
    bench_comparer_lookup,
);

criterion_main!(benches);
