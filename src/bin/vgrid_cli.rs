//! CLI tool for vgrid - runs rows through the grid and prints the render state
//!
//! Usage:
//!   vgrid_cli <rows.json>                          # First window as JSON
//!   vgrid_cli <rows.json> --options grid.json      # With grid options
//!   vgrid_cli <rows.json> --sort age:desc --filter name:contains:an
//!   vgrid_cli <rows.json> --group status --page 2 --scroll-top 400 --viewport 600
//!
//! Set `RUST_LOG=vgrid=debug` for pipeline logging.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use vgrid::viewer::GridContext;
use vgrid::{ColumnDef, FilterCondition, FilterState, FilterType, GridOptions, ScrollDelta, SortDirection, SortEntry};

const USAGE: &str = "Usage: vgrid_cli <rows.json> [--options grid.json] [--sort field:asc|desc] \
[--filter field:type:value] [--group field] [--page N] [--scroll-top PX] [--viewport PX]";

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error reading {path}: {e}")),
    }
}

fn parse_sort(arg: &str) -> SortEntry {
    let (field, direction) = arg.split_once(':').unwrap_or((arg, "asc"));
    let direction = match direction {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => fail(&format!("Unknown sort direction {other:?}")),
    };
    SortEntry {
        field: field.to_string(),
        direction,
    }
}

fn parse_filter(arg: &str) -> (String, FilterCondition) {
    let mut parts = arg.splitn(3, ':');
    let field = parts.next().unwrap_or_default();
    let Some(kind) = parts.next() else {
        fail(&format!("Filter {arg:?} needs field:type[:value]"));
    };
    let filter_type: FilterType = match serde_json::from_value(Value::String(kind.to_string())) {
        Ok(t) => t,
        Err(_) => fail(&format!("Unknown filter type {kind:?}")),
    };
    // Numbers and booleans compare as JSON values; anything else is text.
    let value = parts
        .next()
        .map(|v| serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string())))
        .unwrap_or(Value::Null);
    (field.to_string(), FilterCondition::new(filter_type, value))
}

fn parse_number(flag: &str, value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => fail(&format!("{flag} expects a number, got {value:?}")),
    }
}

/// One leaf column per key of the first record.
fn infer_columns(rows: &[Value]) -> Vec<ColumnDef> {
    rows.first()
        .and_then(Value::as_object)
        .map(|record| record.keys().map(|key| ColumnDef::leaf(key.as_str())).collect())
        .unwrap_or_default()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        fail(USAGE);
    }

    let rows: Vec<Value> = match serde_json::from_str(&read_file(&args[1])) {
        Ok(rows) => rows,
        Err(e) => fail(&format!("Error parsing rows: {e}")),
    };

    let mut options = GridOptions::default();
    let mut sort_state = Vec::new();
    let mut filter_state = FilterState::new();
    let mut group_by = Vec::new();
    let mut page = None;
    let mut scroll_top = 0.0;
    let mut viewport_height = 600.0;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            fail(&format!("{flag} needs a value\n{USAGE}"));
        };
        match flag {
            "--options" => options = GridOptions::from_json(&read_file(value)),
            "--sort" => sort_state.push(parse_sort(value)),
            "--filter" => {
                let (field, condition) = parse_filter(value);
                filter_state.insert(field, condition);
            }
            "--group" => group_by.push(value.clone()),
            "--page" => match value.parse::<usize>() {
                Ok(n) => page = Some(n),
                Err(_) => fail(&format!("--page expects a page number, got {value:?}")),
            },
            "--scroll-top" => scroll_top = parse_number(flag, value),
            "--viewport" => viewport_height = parse_number(flag, value),
            other => fail(&format!("Unknown argument {other:?}\n{USAGE}")),
        }
        i += 2;
    }

    if options.columns.is_empty() {
        options.columns = infer_columns(&rows);
    }

    let mut grid = GridContext::new(options);
    let steps = [
        grid.set_data(rows, None),
        grid.apply_sorting(sort_state),
        grid.apply_filter(filter_state),
        grid.set_group_by(group_by),
    ];
    for result in steps {
        if let Err(e) = result {
            fail(&format!("Error: {e}"));
        }
    }
    if let Some(page) = page {
        if let Err(e) = grid.select_page(page) {
            fail(&format!("Error: {e}"));
        }
    }

    let width = grid.columns().content_width();
    grid.resize(width, viewport_height, 0.0);
    grid.flush();
    grid.scroll_to(None, ScrollDelta::new(scroll_top, 0.0), 0.0);

    let state = grid.render_state();
    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("Error serializing JSON: {e}")),
    }
}
