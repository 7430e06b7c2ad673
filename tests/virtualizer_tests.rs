//! Row virtualization tests
//!
//! Flattening, window selection, offsets and the bounded measure/correct
//! loop over engine output.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::HashSet;

use common::*;
use test_case::test_case;
use vgrid::data::GridDataEngine;
use vgrid::layout::{flatten, FlatEntry, FlattenSource, HeightKey, RowVirtualizer};
use vgrid::{GridOptions, GroupPath, RowId};

fn entries(engine: &GridDataEngine, collapsed: &HashSet<GroupPath>) -> Vec<FlatEntry> {
    flatten(FlattenSource {
        rows: &engine.dataset().page_data,
        groups: engine.render_groups(),
        collapsed,
        nested_rows: true,
    })
}

/// Virtualizer over `n` ungrouped rows at the default 30px height.
fn virtualizer(n: usize) -> RowVirtualizer {
    let engine = engine_with(&options(), people(n));
    let mut virtualizer = RowVirtualizer::new(&GridOptions::default());
    virtualizer.set_entries(entries(&engine, &HashSet::new()));
    virtualizer
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn test_flatten_ungrouped_page() {
    let engine = engine_with(&options(), people(3));
    assert_eq!(describe(&entries(&engine, &HashSet::new())), vec!["r:0@0", "r:1@0", "r:2@0"]);
}

#[test]
fn test_flatten_groups_with_depth() {
    let mut engine = engine_with(&options(), people(6));
    engine.add_group_by_column("team");
    assert_eq!(
        describe(&entries(&engine, &HashSet::new())),
        vec!["g:red@0", "r:0@1", "r:3@1", "g:blue@0", "r:1@1", "r:4@1", "g:green@0", "r:2@1", "r:5@1"]
    );
}

#[test]
fn test_collapsed_group_keeps_only_header() {
    let mut engine = engine_with(&options(), people(6));
    engine.add_group_by_column("team");
    engine.add_group_by_column("address.city");
    engine.toggle_group(&GroupPath::from(vec!["blue"]));

    let flat = describe(&entries(&engine, engine.collapsed_groups()));
    assert_eq!(
        flat,
        vec![
            "g:red@0", "g:Oslo@1", "r:0@2", "g:Lima@1", "r:3@2", "g:blue@0", "g:green@0", "g:Oslo@1", "r:2@2",
            "g:Lima@1", "r:5@2",
        ]
    );
    // Members stay in the dataset.
    assert_eq!(engine.dataset().page_data.len(), 6);
}

#[test]
fn test_flatten_then_collect_rows_restores_group_order() {
    let mut engine = engine_with(&options(), people(9));
    engine.add_group_by_column("team");

    let rows: Vec<u64> = entries(&engine, &HashSet::new())
        .iter()
        .filter_map(FlatEntry::row)
        .map(|row| row.value("id").and_then(serde_json::Value::as_u64).unwrap())
        .collect();
    assert_eq!(rows, ids(&engine.dataset().page_data));
}

#[test]
fn test_expanded_row_adds_nested_entry() {
    let mut engine = engine_with(&options(), people(3));
    let id = engine.dataset().page_data[1].id;
    engine.toggle_nested(id);
    assert_eq!(describe(&entries(&engine, &HashSet::new())), vec!["r:0@0", "r:1@0", "n@0", "r:2@0"]);
}

// ============================================================================
// Window selection
// ============================================================================

#[test]
fn test_zero_rows_give_empty_window() {
    let mut virtualizer = virtualizer(0);
    let window = virtualizer.compute_window(500.0, 300.0);
    assert!(window.is_empty());
    assert_eq!((window.top_offset, window.bottom_offset, window.total_height), (0.0, 0.0, 0.0));
}

#[test]
fn test_window_in_the_middle() {
    let mut virtualizer = virtualizer(1000);
    let window = virtualizer.compute_window(3000.0, 300.0);

    assert_eq!((window.first_visible, window.last_visible), (100, 109));
    assert_eq!((window.start, window.end), (90, 120));
    assert_eq!(window.top_offset, 2700.0);
    assert_eq!(window.bottom_offset, 30000.0 - 3600.0);
    assert_eq!(window.total_height, 30000.0);
}

#[test]
fn test_buffer_overrun_moves_to_other_end() {
    let mut virtualizer = virtualizer(1000);

    let top = virtualizer.compute_window(0.0, 300.0);
    assert_eq!((top.start, top.end), (0, 30));

    let bottom = virtualizer.compute_window(29_700.0, 300.0);
    assert_eq!((bottom.first_visible, bottom.last_visible), (990, 999));
    assert_eq!((bottom.start, bottom.end), (970, 1000));
    assert_eq!(bottom.bottom_offset, 0.0);
}

#[test_case(0.0, 300.0 ; "top")]
#[test_case(1234.5, 300.0 ; "fractional offset")]
#[test_case(14_985.0, 450.0 ; "middle")]
#[test_case(29_999.0, 300.0 ; "last pixel")]
#[test_case(1.0e9, 300.0 ; "beyond the end")]
#[test_case(400.0, 0.0 ; "zero viewport")]
fn test_window_contains_visible_range(scroll_top: f64, viewport: f64) {
    let mut virtualizer = virtualizer(1000);
    let window = virtualizer.compute_window(scroll_top, viewport);

    assert!(window.start <= window.first_visible);
    assert!(window.first_visible <= window.last_visible);
    assert!(window.last_visible < window.end);
    assert!(window.end <= virtualizer.len());
    assert_eq!(window.top_offset, virtualizer.offset_of(window.start));
    let inside: f64 = (window.start..window.end).map(|i| virtualizer.height_of(i)).sum();
    assert_eq!(window.top_offset + inside + window.bottom_offset, window.total_height);
}

// ============================================================================
// Measurement
// ============================================================================

#[test]
fn test_measurements_outside_window_or_invalid_are_ignored() {
    let mut virtualizer = virtualizer(100);
    virtualizer.compute_window(0.0, 300.0);

    assert!(!virtualizer.apply_measurements(&[(80, 45.0), (3, f64::NAN), (4, -2.0)]));
    assert_eq!(virtualizer.total_height(), 3000.0);

    assert!(virtualizer.apply_measurements(&[(3, 45.0)]));
    assert_eq!(virtualizer.total_height(), 3015.0);
    assert_eq!(virtualizer.offset_of(4), 135.0);
}

#[test]
fn test_settle_converges() {
    let mut virtualizer = virtualizer(100);
    let outcome = virtualizer.settle(0.0, 300.0, |window, _| (window.start..window.end).map(|i| (i, 40.0)).collect());

    assert!(outcome.converged);
    assert_eq!(outcome.passes, 2);
    assert_eq!((outcome.window.first_visible, outcome.window.last_visible), (0, 7));
}

#[test]
fn test_settle_stops_at_pass_limit() {
    let mut virtualizer = virtualizer(100);
    let mut pass = 0.0;
    let outcome = virtualizer.settle(0.0, 300.0, |window, _| {
        pass += 1.0;
        (window.start..window.end).map(|i| (i, 30.0 + pass)).collect()
    });

    assert!(!outcome.converged);
    assert_eq!(outcome.passes, GridOptions::default().max_measure_passes);
}

#[test]
fn test_group_and_row_heights_do_not_collide() {
    let mut engine = engine_with(&options(), people(3));
    engine.add_group_by_column("id");
    let mut virtualizer = RowVirtualizer::new(&GridOptions::default());
    virtualizer.set_entries(entries(&engine, &HashSet::new()));
    virtualizer.compute_window(0.0, 300.0);

    // Entry 0 is the group keyed "0", entry 1 the row with identity 0.
    assert!(virtualizer.apply_measurements(&[(0, 55.0)]));
    assert_eq!(virtualizer.heights().get(&HeightKey::Group("0".into())), 55.0);
    assert_eq!(virtualizer.heights().get(&HeightKey::Row(RowId(0))), 30.0);
}

#[test]
fn test_heights_survive_reflatten_while_entry_remains() {
    let mut engine = engine_with(&options(), people(10));
    let mut virtualizer = RowVirtualizer::new(&GridOptions::default());
    virtualizer.set_entries(entries(&engine, &HashSet::new()));
    virtualizer.compute_window(0.0, 300.0);
    virtualizer.apply_measurements(&[(0, 60.0)]);
    let first = engine.dataset().page_data[0].id;

    engine.apply_sorting(vec![vgrid::SortEntry::desc("id")]);
    virtualizer.set_entries(entries(&engine, &HashSet::new()));
    assert_eq!(virtualizer.heights().get(&HeightKey::Row(first)), 60.0);

    engine.apply_filter(
        [("id".to_string(), vgrid::FilterCondition::new(vgrid::FilterType::GreaterThan, 5))]
            .into_iter()
            .collect(),
    );
    virtualizer.set_entries(entries(&engine, &HashSet::new()));
    assert!(!virtualizer.heights().is_measured(&HeightKey::Row(first)));
}
