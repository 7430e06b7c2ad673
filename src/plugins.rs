//! Plugin capability interface and registry.
//!
//! Plugins observe lifecycle events and answer with commands; they never
//! touch grid state directly. The owning [`GridContext`](crate::viewer::GridContext)
//! applies returned commands after dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnLayout;
use crate::data::GridDataEngine;
use crate::layout::RowWindow;
use crate::state::GridState;
use crate::types::{ColumnDef, ColumnId, FilterState, ScrollDelta, SortState};

/// Lifecycle notifications delivered to plugins
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GridEvent {
    AfterRender { window: RowWindow },
    AfterResize { width: f64, height: f64 },
    AfterScroll { delta: ScrollDelta },
    #[serde(rename_all = "camelCase")]
    AfterColumnReorder { columns: Vec<ColumnId> },
    #[serde(rename_all = "camelCase")]
    AfterGroupBy { group_by: Vec<String> },
    AfterPinnedColumnsUpdated { pinned: Vec<ColumnId> },
}

impl GridEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AfterRender { .. } => "afterRender",
            Self::AfterResize { .. } => "afterResize",
            Self::AfterScroll { .. } => "afterScroll",
            Self::AfterColumnReorder { .. } => "afterColumnReorder",
            Self::AfterGroupBy { .. } => "afterGroupBy",
            Self::AfterPinnedColumnsUpdated { .. } => "afterPinnedColumnsUpdated",
        }
    }
}

/// State changes a plugin may ask for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum GridCommand {
    #[serde(rename_all = "camelCase")]
    ApplySorting { sort_state: SortState },
    #[serde(rename_all = "camelCase")]
    ApplyFilter { filter_state: FilterState },
    #[serde(rename_all = "camelCase")]
    SetColumnDefs { column_defs: Vec<ColumnDef> },
    TogglePin { column: ColumnId },
    ToggleGroupBy { field: String },
    SelectPage { page: usize },
    RestoreState { state: GridState },
}

/// Read-only view of the grid handed to plugins
#[derive(Debug, Clone, Copy)]
pub struct PluginContext<'a> {
    pub columns: &'a ColumnLayout,
    pub data: &'a GridDataEngine,
    pub scroll: ScrollDelta,
}

pub trait GridPlugin {
    /// Unique name; registering a second plugin with the same name replaces
    /// the first.
    fn name(&self) -> &str;

    fn on_init(&mut self, _ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        Vec::new()
    }

    fn on_event(&mut self, event: &GridEvent, ctx: &PluginContext<'_>) -> Vec<GridCommand>;

    fn on_destroy(&mut self) {}
}

/// Registered plugins in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn GridPlugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `plugin` and return the commands from its `on_init`.
    pub fn register(&mut self, mut plugin: Box<dyn GridPlugin>, ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        let name = plugin.name().to_string();
        if let Some(pos) = self.plugins.iter().position(|p| p.name() == name) {
            tracing::warn!("Plugin {:?} registered twice; replacing the earlier one", name);
            let mut old = self.plugins.remove(pos);
            old.on_destroy();
        }
        let commands = plugin.on_init(ctx);
        tracing::debug!("Registered plugin {:?}", name);
        self.plugins.push(plugin);
        commands
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(pos) = self.plugins.iter().position(|p| p.name() == name) else {
            return false;
        };
        let mut plugin = self.plugins.remove(pos);
        plugin.on_destroy();
        true
    }

    /// Deliver `event` to every plugin and collect their commands in
    /// registration order.
    pub fn dispatch(&mut self, event: &GridEvent, ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        let mut commands = Vec::new();
        for plugin in &mut self.plugins {
            commands.extend(plugin.on_event(event, ctx));
        }
        commands
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn destroy_all(&mut self) {
        for mut plugin in self.plugins.drain(..) {
            plugin.on_destroy();
        }
    }
}

/// Keeps the latest [`GridState`] after every column, pin or group change.
#[derive(Debug, Default)]
pub struct StateRecorder {
    latest: Rc<RefCell<Option<GridState>>>,
}

impl StateRecorder {
    pub const NAME: &'static str = "stateRecorder";

    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded state; stays valid after the plugin
    /// moves into a registry.
    pub fn handle(&self) -> Rc<RefCell<Option<GridState>>> {
        Rc::clone(&self.latest)
    }

    fn record(&self, ctx: &PluginContext<'_>) {
        *self.latest.borrow_mut() = Some(GridState::capture(ctx.columns, ctx.data));
    }
}

impl GridPlugin for StateRecorder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_init(&mut self, ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        self.record(ctx);
        Vec::new()
    }

    fn on_event(&mut self, event: &GridEvent, ctx: &PluginContext<'_>) -> Vec<GridCommand> {
        if matches!(
            event,
            GridEvent::AfterColumnReorder { .. }
                | GridEvent::AfterGroupBy { .. }
                | GridEvent::AfterPinnedColumnsUpdated { .. }
        ) {
            self.record(ctx);
        }
        Vec::new()
    }
}
