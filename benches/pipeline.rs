//! Benchmarks for the data pipeline and window selection.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use std::collections::HashSet;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use vgrid::columns::ColumnLayout;
use vgrid::data::GridDataEngine;
use vgrid::layout::{flatten, FlattenSource, RowVirtualizer};
use vgrid::{
    ColumnDef, ColumnId, FilterCondition, FilterState, FilterType, GridOptions, Record, RowId,
    RowWrapper, SortEntry,
};

const STATUSES: [&str; 4] = ["open", "closed", "pending", "archived"];

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("user-{:06}", (i * 7919) % n),
                "age": (i * 31) % 90,
                "status": STATUSES[i % STATUSES.len()],
            })
        })
        .collect()
}

fn engine(options: &GridOptions) -> GridDataEngine {
    let columns = ColumnLayout::new(&options.columns, options);
    let mut engine = GridDataEngine::new(options);
    engine.sync_columns(&columns);
    engine
}

fn options() -> GridOptions {
    GridOptions {
        columns: vec![
            ColumnDef::leaf("id"),
            ColumnDef::leaf("name"),
            ColumnDef::leaf("age"),
            ColumnDef::leaf("status"),
        ],
        ..GridOptions::default()
    }
}

/// Multi-key sort over 100k rows
fn bench_sort(c: &mut Criterion) {
    let options = options();
    let rows = records(100_000);
    let mut group = c.benchmark_group("sort");
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("status_then_name_100k", |b| {
        let mut engine = engine(&options);
        engine.set_data(rows.clone(), None);
        let mut toggle = false;
        b.iter(|| {
            toggle = !toggle;
            let second = if toggle {
                SortEntry::asc("name")
            } else {
                SortEntry::desc("name")
            };
            engine.apply_sorting(black_box(vec![SortEntry::asc("status"), second]));
        })
    });
    group.finish();
}

/// Text and numeric filters over 100k rows
fn bench_filter(c: &mut Criterion) {
    let options = options();
    let rows = records(100_000);
    let filters = [
        ("contains", "name", FilterCondition::new(FilterType::Contains, "12")),
        ("greater_than", "age", FilterCondition::new(FilterType::GreaterThan, 45)),
    ];

    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Elements(rows.len() as u64));
    for (name, field, condition) in filters {
        let mut engine = engine(&options);
        engine.set_data(rows.clone(), None);
        let mut active = FilterState::new();
        active.insert(field.to_string(), condition);
        group.bench_with_input(BenchmarkId::new("apply", name), &active, |b, active| {
            b.iter(|| {
                engine.apply_filter(FilterState::new());
                engine.apply_filter(black_box(active.clone()));
            })
        });
    }
    group.finish();
}

/// Window selection over a 1M-entry flattened sequence
fn bench_window(c: &mut Criterion) {
    let options = options();
    let columns: Arc<[ColumnId]> = Arc::from(vec![ColumnId::new("id")]);
    let rows: Vec<RowWrapper> = (0..1_000_000u64)
        .map(|i| {
            RowWrapper::data_row(RowId(i), i as usize, Arc::new(json!({ "id": i })), Arc::clone(&columns))
        })
        .collect();
    let collapsed = HashSet::new();
    let entries = flatten(FlattenSource {
        rows: &rows,
        groups: None,
        collapsed: &collapsed,
        nested_rows: false,
    });

    let mut virtualizer = RowVirtualizer::new(&options);
    virtualizer.set_entries(entries);
    let total = virtualizer.total_height();

    c.bench_function("compute_window_1m", |b| {
        let mut top = 0.0;
        b.iter(|| {
            top = (top + 9_973.0) % total;
            black_box(virtualizer.compute_window(black_box(top), 600.0));
        })
    });
}

criterion_group!(benches, bench_sort, bench_filter, bench_window);

criterion_main!(benches);
