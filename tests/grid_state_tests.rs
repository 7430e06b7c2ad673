//! Saved grid state, plugin dispatch and the one-shot pipeline entry.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::float_cmp)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use vgrid::plugins::{GridCommand, GridEvent, GridPlugin, PluginContext, StateRecorder};
use vgrid::state::GridState;
use vgrid::viewer::{GridContext, MAX_EVENT_CASCADE};
use vgrid::{ColumnDef, ColumnId, ScrollDelta, ScrollSurface, SortEntry};

use common::{context_with, ids, options, people};

/// Records event names and answers every event with `reply`.
struct Listener {
    seen: Rc<RefCell<Vec<&'static str>>>,
    reply: Option<GridCommand>,
    only_on: Option<&'static str>,
}

impl Listener {
    fn new(seen: &Rc<RefCell<Vec<&'static str>>>) -> Self {
        Self {
            seen: Rc::clone(seen),
            reply: None,
            only_on: None,
        }
    }
}

impl GridPlugin for Listener {
    fn name(&self) -> &str {
        "listener"
    }

    fn on_event(&mut self, event: &GridEvent, _ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        self.seen.borrow_mut().push(event.name());
        match self.only_on {
            Some(name) if name != event.name() => Vec::new(),
            _ => self.reply.clone().into_iter().collect(),
        }
    }
}

// ============================================================================
// GridState
// ============================================================================

#[test]
fn test_saved_state_json_uses_camel_case() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    ctx.apply_sorting(vec![SortEntry::desc("age")]).unwrap();
    ctx.add_group_by_column("team").unwrap();

    let json = ctx.save_state().to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["sortState"][0]["field"], "age");
    assert_eq!(value["sortState"][0]["direction"], "desc");
    assert_eq!(value["groupBy"], json!(["team"]));
    assert_eq!(value["columnDefs"].as_array().unwrap().len(), 5);
}

#[test]
fn test_restore_onto_fresh_grid_matches_columns_on_field() {
    let mut saved_from = context_with(options(), people(6), 800.0, 400.0);
    saved_from.set_column_width(&ColumnId::from("age"), "90px");
    saved_from.toggle_pin(&ColumnId::from("age"));
    saved_from.set_column_visible(&ColumnId::from("team"), false);
    saved_from.apply_sorting(vec![SortEntry::desc("age")]).unwrap();
    let json = saved_from.save_state().to_json().unwrap();

    // Same fields, different ids.
    let mut renamed = options();
    for def in &mut renamed.columns {
        def.id = format!("col-{}", def.field.clone().unwrap());
    }
    let mut ctx = context_with(renamed, people(6), 800.0, 400.0);
    ctx.restore_state(GridState::from_json(&json).unwrap()).unwrap();

    let age = ctx.columns().column_by_field("age").unwrap();
    assert_eq!(age.id, ColumnId::from("col-age"));
    assert_eq!(age.def.width.as_deref(), Some("90px"));
    assert!(age.def.pinned);
    assert!(!ctx.columns().column_by_field("team").unwrap().def.visible);
    assert_eq!(ctx.columns().leaf_fields(), saved_from.columns().leaf_fields());

    let ages: Vec<u64> = ctx
        .data()
        .dataset()
        .page_data
        .iter()
        .map(|row| row.value("age").and_then(Value::as_u64).unwrap())
        .collect();
    let mut expected = ages.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ages, expected);
}

#[test]
fn test_restore_drops_unknown_sort_and_group_fields() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    let state = GridState {
        column_defs: Vec::new(),
        sort_state: vec![SortEntry::asc("missing"), SortEntry::desc("age")],
        group_by: vec!["missing".to_string(), "team".to_string()],
    };
    ctx.restore_state(state).unwrap();

    assert_eq!(ctx.data().sort_state().to_vec(), vec![SortEntry::desc("age")]);
    assert_eq!(ctx.data().group_by().to_vec(), vec!["team".to_string()]);
    // Columns untouched by an empty saved list.
    assert_eq!(ctx.columns().leaf_fields().len(), 5);
}

#[test]
fn test_restore_state_from_partial_json() {
    let state = GridState::from_json(r#"{"groupBy":["team"]}"#).unwrap();
    assert!(state.column_defs.is_empty());
    assert!(state.sort_state.is_empty());
    assert_eq!(state.group_by, vec!["team".to_string()]);
}

// ============================================================================
// Plugins
// ============================================================================

#[test]
fn test_state_recorder_follows_group_and_pin_changes() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    let recorder = StateRecorder::new();
    let latest = recorder.handle();
    ctx.register_plugin(Box::new(recorder));
    assert_eq!(ctx.plugin_names(), vec![StateRecorder::NAME]);
    assert!(latest.borrow().as_ref().unwrap().group_by.is_empty());

    ctx.add_group_by_column("team").unwrap();
    assert_eq!(latest.borrow().as_ref().unwrap().group_by, vec!["team".to_string()]);

    ctx.toggle_pin(&ColumnId::from("name"));
    let recorded = latest.borrow().clone().unwrap();
    let name = recorded
        .column_defs
        .iter()
        .find(|def| def.field.as_deref() == Some("name"))
        .unwrap();
    assert!(name.pinned);
}

#[test]
fn test_plugin_commands_are_applied() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut listener = Listener::new(&seen);
    listener.reply = Some(GridCommand::ApplySorting {
        sort_state: vec![SortEntry::desc("id")],
    });
    listener.only_on = Some("afterGroupBy");
    ctx.register_plugin(Box::new(listener));

    ctx.set_group_by(Vec::new()).unwrap();
    assert!(seen.borrow().is_empty());

    ctx.add_group_by_column("address.city").unwrap();
    assert_eq!(seen.borrow().as_slice(), ["afterGroupBy"]);
    assert_eq!(ctx.data().sort_state().to_vec(), vec![SortEntry::desc("id")]);
    assert_eq!(ids(&ctx.data().dataset().page_data), vec![5, 3, 1, 4, 2, 0]);
}

#[test]
fn test_plugin_event_cascade_is_bounded() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut listener = Listener::new(&seen);
    listener.reply = Some(GridCommand::TogglePin {
        column: ColumnId::from("name"),
    });
    ctx.register_plugin(Box::new(listener));

    ctx.toggle_pin(&ColumnId::from("name"));
    assert_eq!(seen.borrow().len(), MAX_EVENT_CASCADE);

    // Dispatch recovers for the next event.
    ctx.resize(640.0, 300.0, 0.0);
    assert_eq!(seen.borrow().len(), MAX_EVENT_CASCADE * 2);
    assert_eq!(seen.borrow()[MAX_EVENT_CASCADE], "afterResize");
}

#[test]
fn test_lifecycle_events_reach_plugins() {
    let mut ctx = context_with(options(), people(100), 800.0, 300.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    ctx.register_plugin(Box::new(Listener::new(&seen)));

    ctx.resize(800.0, 320.0, 0.0);
    ctx.scroll_to(Some(ScrollSurface::Body), ScrollDelta::new(400.0, 0.0), 0.0);
    assert!(ctx.tick(1_000_000.0));

    assert_eq!(seen.borrow().as_slice(), ["afterResize", "afterScroll", "afterRender"]);
}

#[test]
fn test_registering_same_name_replaces_plugin() {
    let mut ctx = GridContext::new(options());
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    ctx.register_plugin(Box::new(Listener::new(&first)));
    ctx.register_plugin(Box::new(Listener::new(&second)));
    assert_eq!(ctx.plugin_names(), vec!["listener"]);

    ctx.resize(400.0, 200.0, 0.0);
    assert!(first.borrow().is_empty());
    assert_eq!(second.borrow().as_slice(), ["afterResize"]);

    assert!(ctx.unregister_plugin("listener"));
    assert!(ctx.plugin_names().is_empty());
}

#[test]
fn test_restore_command_from_plugin() {
    let mut ctx = context_with(options(), people(6), 800.0, 400.0);
    let state = GridState {
        column_defs: vec![ColumnDef::leaf("team").pinned()],
        sort_state: Vec::new(),
        group_by: vec!["team".to_string()],
    };
    ctx.apply_command(GridCommand::RestoreState { state }).unwrap();

    assert_eq!(ctx.columns().leaf_fields()[0], "team");
    assert!(ctx.columns().column_by_field("team").unwrap().def.pinned);
    assert_eq!(ctx.data().group_by().to_vec(), vec!["team".to_string()]);
}

// ============================================================================
// process_rows
// ============================================================================

#[test]
fn test_process_rows_json_pages_rows() {
    let rows = serde_json::to_string(&people(5)).unwrap();
    let options = json!({ "columns": [{ "field": "id" }, { "field": "name" }], "pageSize": 2 });
    let out = vgrid::process_rows_json(&rows, &options.to_string()).unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();

    let page = value["pageData"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[1]["data"]["name"], "person-001");
    assert_eq!(value["totalRowCount"], 5);
}

#[test]
fn test_process_rows_json_rejects_bad_rows() {
    assert!(vgrid::process_rows_json("{not json", "{}").is_err());
}
