//! Sequential vs chunked-parallel aggregation over synthetic facility-month records.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use facility_dashboard::execution::{ExecutionEngine, ExecutionOptions};
use facility_dashboard::processing::{aggregate, filter, Aggregate, AggregateSpec, Condition, FilterSpec, MONTHS};
use facility_dashboard::types::{DataSet, DataType, Field, Schema, Value};

fn facility_rows(row_count: usize) -> DataSet {
    let schema = Schema::new(vec![
        Field::new("subcountydivision", DataType::Utf8),
        Field::new("health_facility", DataType::Utf8),
        Field::new("month", DataType::Utf8),
        Field::new("deliveries_total", DataType::Int64),
        Field::new("predicted_anc", DataType::Float64),
    ]);
    let rows = (0..row_count)
        .map(|i| {
            let subcounty = if i % 97 == 0 {
                Value::Null
            } else {
                Value::Utf8(format!("subcounty_{}", i % 25))
            };
            vec![
                subcounty,
                Value::Utf8(format!("facility_{}", i % 400)),
                Value::from(MONTHS[i % 12]),
                Value::Int64((i % 90) as i64),
                Value::Float64((i % 130) as f64 + 0.5),
            ]
        })
        .collect();
    DataSet::new(schema, rows)
}

fn summary_spec() -> AggregateSpec {
    AggregateSpec::new()
        .group_by(["subcountydivision", "month"])
        .with(Aggregate::sum("deliveries_total"))
        .with(Aggregate::sum("predicted_anc"))
        .with(Aggregate::count_distinct("health_facility"))
        .with(Aggregate::count_above("deliveries_total", 50.0))
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let spec = summary_spec();

    for row_count in [10_000, 100_000] {
        let ds = facility_rows(row_count);
        group.throughput(Throughput::Elements(row_count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", row_count), &ds, |b, ds| {
            b.iter(|| black_box(aggregate(ds, &spec).unwrap()))
        });

        for threads in [2, 4] {
            let engine = ExecutionEngine::new(ExecutionOptions {
                num_threads: Some(threads),
                chunk_size: 4_096,
                max_in_flight_chunks: threads,
            });
            group.bench_with_input(
                BenchmarkId::new(format!("parallel_{threads}_threads"), row_count),
                &ds,
                |b, ds| b.iter(|| black_box(engine.aggregate_parallel(ds, &spec).unwrap())),
            );
        }
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let spec = FilterSpec::new()
        .with(Condition::is_in("month", ["Jan", "Feb", "Mar"]))
        .with(Condition::between("predicted_anc", 50.0, 99.0));
    let ds = facility_rows(100_000);
    let engine = ExecutionEngine::new(ExecutionOptions::default());
    group.throughput(Throughput::Elements(ds.row_count() as u64));

    group.bench_function("sequential", |b| b.iter(|| black_box(filter(&ds, &spec).unwrap())));
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(engine.filter_parallel(&ds, &spec).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_filter);
criterion_main!(benches);
