//! Common test utilities and builders.
//!
//! Record generators, engine/context constructors and helpers for pulling
//! values back out of derived rows.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use serde_json::{json, Value};
use vgrid::columns::ColumnLayout;
use vgrid::data::GridDataEngine;
use vgrid::layout::FlatEntry;
use vgrid::viewer::GridContext;
use vgrid::{ColumnDef, GridOptions, Record, RowWrapper};

pub const TEAMS: [&str; 3] = ["red", "blue", "green"];

// ============================================================================
// Records
// ============================================================================

/// `n` people with an id, name, age, team and nested address.
pub fn people(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("person-{i:03}"),
                "age": 20 + (i * 7) % 40,
                "team": TEAMS[i % TEAMS.len()],
                "address": { "city": if i % 2 == 0 { "Oslo" } else { "Lima" } },
            })
        })
        .collect()
}

/// Leaf columns for every field of [`people`].
pub fn people_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::leaf("id"),
        ColumnDef::leaf("name"),
        ColumnDef::leaf("age"),
        ColumnDef::leaf("team"),
        ColumnDef::leaf("address.city"),
    ]
}

pub fn options() -> GridOptions {
    GridOptions {
        columns: people_columns(),
        ..GridOptions::default()
    }
}

pub fn paged_options(page_size: usize) -> GridOptions {
    GridOptions {
        page_size: Some(page_size),
        ..options()
    }
}

// ============================================================================
// Engines
// ============================================================================

/// Data engine synced to the columns of `options` and loaded with `rows`.
pub fn engine_with(options: &GridOptions, rows: Vec<Record>) -> GridDataEngine {
    let columns = ColumnLayout::new(&options.columns, options);
    let mut engine = GridDataEngine::new(options);
    engine.sync_columns(&columns);
    engine.set_data(rows, None);
    engine
}

/// Grid context sized `width` x `height`, loaded with `rows` and flushed.
pub fn context_with(options: GridOptions, rows: Vec<Record>, width: f64, height: f64) -> GridContext {
    let mut ctx = GridContext::new(options);
    ctx.set_data(rows, None).unwrap();
    ctx.resize(width, height, 0.0);
    ctx.flush();
    ctx
}

// ============================================================================
// Extraction
// ============================================================================

/// `field` of every row, in order.
pub fn column_values(rows: &[RowWrapper], field: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| row.value(field).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Ids (the `id` field) of every row, in order.
pub fn ids(rows: &[RowWrapper]) -> Vec<u64> {
    column_values(rows, "id")
        .into_iter()
        .map(|v| v.as_u64().expect("numeric id"))
        .collect()
}

/// Compact description of a flattened sequence: `g:<key>@depth` for group
/// lines, `r:<id>@depth` for rows and `n@depth` for nested content.
pub fn describe(entries: &[FlatEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match entry {
            FlatEntry::Group { key, depth, .. } => format!("g:{key}@{depth}"),
            FlatEntry::Row { row, depth } => {
                let id = row.value("id").and_then(Value::as_u64).unwrap_or(u64::MAX);
                format!("r:{id}@{depth}")
            }
            FlatEntry::Nested { depth, .. } => format!("n@{depth}"),
        })
        .collect()
}
