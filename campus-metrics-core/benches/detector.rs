use std::hint::black_box;

use campus_metrics_core::enrichment::{join_tables, summarize, train_and_score};
use campus_metrics_core::models::SourceTables;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

fn readings(n: usize) -> Vec<f64> {
    let mut values: Vec<f64> = (0..n).map(|i| 118.0 + (i % 5) as f64).collect();
    values.push(1200.0);
    values
}

fn workbook(days: usize) -> SourceTables {
    let mut facts = Vec::with_capacity(days * 2);
    for day in 0..days {
        for (key, goal) in [(1, 120), (2, 250)] {
            facts.push(json!({
                "Date": format!("2026-{:02}-{:02}", day / 28 + 1, day % 28 + 1),
                "BuildingKey": key,
                "Value": goal - 2 + (day % 5) as i64,
                "Goal": goal
            }));
        }
    }
    SourceTables::from_rows(
        facts,
        vec![
            json!({"BuildingKey": 1, "BuildingName": "SPJIMR ACAD BLOCK", "Type": "Academic"}),
            json!({"BuildingKey": 2, "BuildingName": "HOSTEL B30", "Type": "Residential"}),
        ],
        vec![],
    )
}

fn bench_train_and_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("train_and_score");
    for size in [50, 500, 5_000] {
        let values = readings(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &values, |b, values| {
            b.iter(|| black_box(train_and_score(values, 0.05, 42).unwrap()));
        });
    }
    group.finish();
}

fn bench_join_and_summarize(c: &mut Criterion) {
    let tables = workbook(300);
    c.bench_function("join_and_summarize_600_rows", |b| {
        b.iter(|| {
            let outcome = join_tables(&tables).unwrap();
            black_box(summarize(&outcome.records));
        });
    });
}

criterion_group!(benches, bench_train_and_score, bench_join_and_summarize);
criterion_main!(benches);
