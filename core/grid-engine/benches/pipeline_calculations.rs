//! Benchmarks for full pipeline runs
//!
//! Run with: cargo bench -p grid-engine

use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_engine::{
    ColumnDescriptor, ColumnEntry, ColumnSet, Filter, GridValue, GroupDefinition, GroupKey,
    Pipeline, PipelineOptions, SortSpec,
};

struct Sale {
    region: String,
    product: String,
    amount: f64,
}

fn create_records(count: usize) -> Vec<Arc<Sale>> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Apples", "Oranges", "Pears", "Plums", "Kiwis"];
    (0..count)
        .map(|i| {
            Arc::new(Sale {
                region: regions[i % regions.len()].to_string(),
                product: products[(i * 7) % products.len()].to_string(),
                amount: ((i * 37) % 1000) as f64,
            })
        })
        .collect()
}

fn sum_amounts(members: &[&Sale], _key: &GroupKey<GridValue>) -> f64 {
    members.iter().map(|s| s.amount).sum()
}

fn create_pipeline(include_filtered: bool) -> Pipeline<Sale, GridValue, GridValue, f64> {
    let entries: Vec<ColumnEntry<Sale, GridValue>> = vec![
        ColumnDescriptor::new("region", |s: &Sale| GridValue::text(s.region.clone())).into(),
        ColumnDescriptor::new("product", |s: &Sale| GridValue::text(s.product.clone())).into(),
        ColumnDescriptor::new("amount", |s: &Sale| GridValue::number(s.amount)).into(),
    ];
    let columns = match ColumnSet::new(entries) {
        Ok(columns) => columns,
        Err(e) => panic!("benchmark columns: {}", e),
    };
    Pipeline::new(columns)
        .with_reducer(sum_amounts)
        .with_options(PipelineOptions {
            include_filtered_elements_in_aggregates: include_filtered,
            show_aggregates: true,
            ..PipelineOptions::default()
        })
}

fn create_groups() -> Vec<GroupDefinition<Sale, GridValue, f64>> {
    vec![
        GroupDefinition::new("region", |s: &Sale| GridValue::text(s.region.clone())),
        GroupDefinition::<Sale, GridValue, f64>::new("product", |s: &Sale| {
            GridValue::text(s.product.clone())
        })
        .with_comparator(|_, _, a, b| {
            let a = a.map(|a| a.value).unwrap_or(0.0);
            let b = b.map(|b| b.value).unwrap_or(0.0);
            b.total_cmp(&a)
        }),
    ]
}

fn bench_compute_elements(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_elements");
    let groups = create_groups();
    let sorts = vec![SortSpec::desc("amount"), SortSpec::asc("product")];
    let filters = vec![Filter::new("amount", |v: &GridValue| {
        v.as_f64().is_some_and(|a| a >= 250.0)
    })];

    for size in [1_000, 10_000, 100_000].iter() {
        let records = create_records(*size);
        group.throughput(Throughput::Elements(*size as u64));

        for (label, include_filtered) in [("pre_group", false), ("post_group", true)] {
            let pipeline = create_pipeline(include_filtered);
            group.bench_with_input(BenchmarkId::new(label, size), &records, |b, records| {
                b.iter(|| {
                    pipeline
                        .compute_elements(black_box(records), &groups, &sorts, &filters)
                        .map(|list| list.total_count())
                })
            });
        }
    }

    group.finish();
}

fn bench_sort_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_only");
    let pipeline = create_pipeline(false);
    let sorts = vec![SortSpec::asc("region"), SortSpec::desc("amount")];

    for size in [10_000, 100_000].iter() {
        let records = create_records(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                pipeline
                    .compute_elements(black_box(records), &[], &sorts, &[])
                    .map(|list| list.total_count())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_elements, bench_sort_only);

criterion_main!(benches);
