//! Per-grid context owning every engine of one grid instance.
//!
//! Mutations mark work dirty; `tick` performs the deferred flatten and window
//! recomputation at most once per frame, or at once when the viewport has
//! left the materialized window. The settle delay only gates measurement.

use std::collections::VecDeque;

use serde::Serialize;

use super::scroll::{ScrollCoordinator, ScrollSubscriber, ScrollUpdate, SubscriptionId};
use crate::columns::{column_width_px, ColumnLayout, HeaderCell, PinnedLayout, PinnedSurfaces};
use crate::data::{
    Comparator, DataChange, DataResponse, FilterFn, GridDataEngine, Pagination, PendingRequest,
    RemoteDataSource,
};
use crate::error::Result;
use crate::layout::{
    flatten, FlatEntry, FlattenSource, HeightKey, RowVirtualizer, RowWindow, SettleOutcome, Viewport,
};
use crate::plugins::{GridCommand, GridEvent, GridPlugin, PluginContext, PluginRegistry};
use crate::state::{restore_column_defs, GridState};
use crate::types::{
    ColumnDef, ColumnId, FilterState, GridFeature, GridOptions, GroupPath, Record, RowId,
    RowWrapper, ScrollDelta, ScrollExtents, ScrollSurface, SortState, FRAME_INTERVAL_MS,
};

/// Events delivered in one dispatch before the queue is dropped
pub const MAX_EVENT_CASCADE: usize = 32;

/// One visible leaf column as the cell host needs it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderColumn {
    pub id: ColumnId,
    pub field: Option<String>,
    pub label: String,
    pub width: f64,
    pub pinned: bool,
    pub last_pinned: bool,
    /// Left offset inside the frozen band, pinned columns only
    pub sticky_left: Option<f64>,
}

/// Snapshot handed to the render host after a settled cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub window: RowWindow,
    /// Entries `window.start..window.end` of the flattened sequence
    pub entries: Vec<FlatEntry>,
    pub columns: Vec<RenderColumn>,
    pub header_rows: Vec<Vec<HeaderCell>>,
    pub feature_width: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub scroll: ScrollDelta,
    pub pinned: PinnedLayout,
    pub pagination: Pagination,
    pub total_row_count: usize,
    pub header_row: Option<RowWrapper>,
    pub footer_row: Option<RowWrapper>,
    pub filler_rows: Vec<RowWrapper>,
}

pub struct GridContext {
    options: GridOptions,
    columns: ColumnLayout,
    data: GridDataEngine,
    virtualizer: RowVirtualizer,
    scroll: ScrollCoordinator,
    viewport: Viewport,
    plugins: PluginRegistry,
    remote: Option<Box<dyn RemoteDataSource>>,
    pending_fetch: bool,
    needs_flatten: bool,
    needs_window: bool,
    measure_passes: usize,
    last_event_ms: f64,
    last_flush_ms: f64,
    events: VecDeque<GridEvent>,
    dispatching: bool,
}

impl std::fmt::Debug for GridContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridContext")
            .field("columns", &self.columns)
            .field("data", &self.data)
            .field("viewport", &self.viewport)
            .field("scroll", &self.scroll)
            .field("plugins", &self.plugins)
            .field("remote", &self.remote.is_some())
            .field("pending_fetch", &self.pending_fetch)
            .field("needs_flatten", &self.needs_flatten)
            .field("needs_window", &self.needs_window)
            .finish_non_exhaustive()
    }
}

impl Default for GridContext {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

impl Drop for GridContext {
    fn drop(&mut self) {
        self.plugins.destroy_all();
    }
}

impl GridContext {
    pub fn new(options: GridOptions) -> Self {
        let options = options.sanitized();
        let columns = ColumnLayout::new(&options.columns, &options);
        let mut data = GridDataEngine::new(&options);
        data.sync_columns(&columns);
        let mut viewport = Viewport::new();
        viewport.set_chrome_heights(options.header_height, options.footer_height);
        Self {
            virtualizer: RowVirtualizer::new(&options),
            scroll: ScrollCoordinator::new(options.wheel_guard_ms),
            options,
            columns,
            data,
            viewport,
            plugins: PluginRegistry::new(),
            remote: None,
            pending_fetch: false,
            needs_flatten: true,
            needs_window: true,
            measure_passes: 0,
            last_event_ms: f64::NEG_INFINITY,
            last_flush_ms: f64::NEG_INFINITY,
            events: VecDeque::new(),
            dispatching: false,
        }
    }

    /// Replace the options. Column definitions are replaced only when the new
    /// options carry some.
    pub fn set_options(&mut self, options: GridOptions) -> Result<()> {
        let options = options.sanitized();
        if !options.columns.is_empty() && options.columns != self.options.columns {
            self.columns.set_column_defs(&options.columns);
        }
        self.columns.set_options(&options);
        self.virtualizer.configure(&options);
        self.scroll.set_wheel_guard_ms(options.wheel_guard_ms);
        self.viewport
            .set_chrome_heights(options.header_height, options.footer_height);
        self.options = options;
        let change = self
            .data
            .configure(&self.options)
            .merge(self.data.sync_columns(&self.columns));
        self.handle_change(change)
    }

    fn handle_change(&mut self, change: DataChange) -> Result<()> {
        if change.recomputed {
            self.needs_flatten = true;
            self.needs_window = true;
        }
        if change.scroll_reset {
            self.reset_scroll();
        }
        if change.needs_fetch {
            return self.fetch();
        }
        Ok(())
    }

    // ---- data ------------------------------------------------------------

    pub fn set_data(&mut self, rows: Vec<Record>, total_count: Option<usize>) -> Result<()> {
        let change = self.data.set_data(rows, total_count);
        self.handle_change(change)
    }

    pub fn set_comparator(&mut self, comparator: Option<Box<Comparator>>) -> Result<()> {
        let change = self.data.set_comparator(comparator);
        self.handle_change(change)
    }

    pub fn set_custom_filter(&mut self, predicate: Option<Box<FilterFn>>) -> Result<()> {
        let change = self.data.set_custom_filter(predicate);
        self.handle_change(change)
    }

    pub fn apply_sorting(&mut self, sort_state: SortState) -> Result<()> {
        let change = self.data.apply_sorting(sort_state);
        self.handle_change(change)
    }

    pub fn apply_filter(&mut self, filter_state: FilterState) -> Result<()> {
        let change = self.data.apply_filter(filter_state);
        self.handle_change(change)
    }

    pub fn add_group_by_column(&mut self, field: &str) -> Result<()> {
        let change = self.data.add_group_by_column(field);
        self.after_group_change(change)
    }

    pub fn remove_group_by_column(&mut self, field: &str) -> Result<()> {
        let change = self.data.remove_group_by_column(field);
        self.after_group_change(change)
    }

    pub fn set_group_by(&mut self, fields: Vec<String>) -> Result<()> {
        let change = self.data.set_group_by(fields);
        self.after_group_change(change)
    }

    /// Add `field` to the group-by list, or remove it when already there.
    pub fn toggle_group_by(&mut self, field: &str) -> Result<()> {
        if self.data.group_by().iter().any(|f| f == field) {
            self.remove_group_by_column(field)
        } else {
            self.add_group_by_column(field)
        }
    }

    fn after_group_change(&mut self, change: DataChange) -> Result<()> {
        if change == DataChange::NONE {
            return Ok(());
        }
        self.handle_change(change)?;
        self.emit(GridEvent::AfterGroupBy {
            group_by: self.data.group_by().to_vec(),
        });
        Ok(())
    }

    pub fn select_page(&mut self, page: usize) -> Result<()> {
        let change = self.data.select_page(page);
        self.handle_change(change)
    }

    // ---- remote ----------------------------------------------------------

    /// Route data requests through a synchronous source, or back to local
    /// processing with `None`.
    pub fn set_remote_source(&mut self, source: Option<Box<dyn RemoteDataSource>>) -> Result<()> {
        let enabled = source.is_some();
        self.remote = source;
        self.set_remote(enabled)
    }

    /// Enable remote mode without a synchronous source; requests are then
    /// picked up with [`Self::take_pending_request`].
    pub fn set_remote(&mut self, enabled: bool) -> Result<()> {
        self.data.set_remote(enabled);
        if enabled {
            return self.fetch();
        }
        self.remote = None;
        self.pending_fetch = false;
        let change = self.data.configure(&self.options);
        self.handle_change(change)
    }

    fn fetch(&mut self) -> Result<()> {
        let Some(source) = self.remote.as_deref() else {
            self.pending_fetch = true;
            return Ok(());
        };
        self.pending_fetch = false;
        let change = self.data.fetch(source)?;
        self.handle_change(change)
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending_fetch
    }

    /// Request the asynchronous host must issue, if any. Taking it
    /// supersedes every request issued before.
    pub fn take_pending_request(&mut self) -> Option<PendingRequest> {
        if !self.pending_fetch {
            return None;
        }
        self.pending_fetch = false;
        Some(self.data.begin_request())
    }

    pub fn apply_remote_response(&mut self, generation: u64, response: Result<DataResponse>) -> Result<()> {
        let change = self.data.apply_response(generation, response)?;
        self.handle_change(change)
    }

    // ---- columns ---------------------------------------------------------

    pub fn set_column_defs(&mut self, defs: &[ColumnDef]) -> Result<()> {
        self.columns.set_column_defs(defs);
        let change = self.data.sync_columns(&self.columns);
        self.handle_change(change)?;
        self.rescroll();
        self.emit(GridEvent::AfterColumnReorder {
            columns: self.columns.leaf_ids(),
        });
        Ok(())
    }

    pub fn toggle_pin(&mut self, id: &ColumnId) -> bool {
        if !self.columns.toggle_pin(id) {
            tracing::warn!("Cannot pin unknown column {}", id);
            return false;
        }
        let change = self.data.sync_columns(&self.columns);
        self.needs_flatten |= change.recomputed;
        self.needs_window |= change.recomputed;
        self.rescroll();
        self.emit(GridEvent::AfterPinnedColumnsUpdated {
            pinned: self.columns.pinned_columns().iter().map(|c| c.id.clone()).collect(),
        });
        true
    }

    pub fn set_column_visible(&mut self, id: &ColumnId, visible: bool) -> bool {
        let changed = self.columns.set_visible(id, visible);
        if changed {
            self.rescroll();
        }
        changed
    }

    pub fn set_column_width(&mut self, id: &ColumnId, width: &str) -> bool {
        let changed = self.columns.set_width(id, width);
        if changed {
            self.rescroll();
        }
        changed
    }

    pub fn set_column_dynamic_width(&mut self, id: &ColumnId, width: Option<String>) -> bool {
        let changed = self.columns.set_dynamic_width(id, width);
        if changed {
            self.rescroll();
        }
        changed
    }

    pub fn move_column(&mut self, id: &ColumnId, to_index: usize) -> bool {
        if !self.columns.move_column(id, to_index) {
            return false;
        }
        let change = self.data.sync_columns(&self.columns);
        self.needs_flatten |= change.recomputed;
        self.needs_window |= change.recomputed;
        self.emit(GridEvent::AfterColumnReorder {
            columns: self.columns.leaf_ids(),
        });
        true
    }

    // ---- groups and row UI state -----------------------------------------

    pub fn toggle_group(&mut self, path: &GroupPath) -> Option<bool> {
        let expanded = self.data.toggle_group(path)?;
        self.needs_flatten = true;
        Some(expanded)
    }

    pub fn expand_all_groups(&mut self) {
        self.data.expand_all_groups();
        self.needs_flatten = true;
    }

    pub fn collapse_all_groups(&mut self) {
        self.data.collapse_all_groups();
        self.needs_flatten = true;
    }

    pub fn toggle_selected(&mut self, id: RowId) -> Option<bool> {
        let selected = self.data.toggle_selected(id)?;
        self.needs_flatten = true;
        Some(selected)
    }

    pub fn select_all(&mut self, selected: bool) {
        self.data.select_all(selected);
        self.needs_flatten = true;
    }

    /// Flip a row's nested content; its height is measured afresh.
    pub fn toggle_nested(&mut self, id: RowId) -> Option<bool> {
        let expanded = self.data.toggle_nested(id)?;
        self.virtualizer.invalidate(&HeightKey::Row(id));
        self.virtualizer.invalidate(&HeightKey::Nested(id));
        self.needs_flatten = true;
        Some(expanded)
    }

    // ---- viewport and scrolling ------------------------------------------

    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) {
        self.viewport.resize(width, height);
        self.last_event_ms = now_ms;
        self.needs_window = true;
        self.rescroll();
        self.emit(GridEvent::AfterResize {
            width: self.viewport.width,
            height: self.viewport.height,
        });
    }

    /// Scroll every surface to `requested` as reported by `source`.
    pub fn scroll_to(&mut self, source: Option<ScrollSurface>, requested: ScrollDelta, now_ms: f64) -> ScrollUpdate {
        let extents = self.extents();
        let surfaces = self.pinned_surfaces();
        let update = self
            .scroll
            .scroll_grid(source, requested, &extents, &self.columns, surfaces);
        self.last_event_ms = now_ms;
        self.after_scroll(&update, &extents);
        update
    }

    /// Apply a wheel delta; `None` while the wheel guard is active.
    pub fn wheel(
        &mut self,
        source: Option<ScrollSurface>,
        delta_x: f64,
        delta_y: f64,
        now_ms: f64,
    ) -> Option<ScrollUpdate> {
        let extents = self.extents();
        let surfaces = self.pinned_surfaces();
        let update = self.scroll.on_wheel(
            source,
            delta_x,
            delta_y,
            now_ms,
            &extents,
            &self.columns,
            surfaces,
        )?;
        self.last_event_ms = now_ms;
        self.after_scroll(&update, &extents);
        Some(update)
    }

    fn after_scroll(&mut self, update: &ScrollUpdate, extents: &ScrollExtents) {
        self.viewport.set_scroll(update.delta, extents);
        if update.changed {
            self.needs_window = true;
            self.emit(GridEvent::AfterScroll { delta: update.delta });
        }
    }

    /// Re-clamp the current position after content or viewport size changed.
    fn rescroll(&mut self) {
        let extents = self.extents();
        let current = self.scroll.delta();
        if extents.clamp(current) == current {
            return;
        }
        let surfaces = self.pinned_surfaces();
        let update = self
            .scroll
            .scroll_grid(None, current, &extents, &self.columns, surfaces);
        self.after_scroll(&update, &extents);
    }

    fn reset_scroll(&mut self) {
        let extents = self.extents();
        let surfaces = self.pinned_surfaces();
        let update = self.scroll.reset(&extents, &self.columns, surfaces);
        self.after_scroll(&update, &extents);
    }

    pub fn subscribe_scroll(&mut self, subscriber: ScrollSubscriber) -> SubscriptionId {
        self.scroll.subscribe(subscriber)
    }

    pub fn unsubscribe_scroll(&mut self, id: SubscriptionId) -> bool {
        self.scroll.unsubscribe(id)
    }

    fn filler_height(&self) -> f64 {
        self.data.dataset().filler_rows.len() as f64 * self.options.row_height
    }

    /// Clamping bounds for the current content and viewport.
    pub fn extents(&mut self) -> ScrollExtents {
        self.flatten_if_needed();
        let content_height = self.virtualizer.total_height() + self.filler_height();
        self.viewport.extents(
            self.columns.content_width(),
            content_height,
            self.options.scrollbar_width,
        )
    }

    fn pinned_surfaces(&self) -> PinnedSurfaces {
        PinnedSurfaces {
            filler: !self.data.dataset().filler_rows.is_empty(),
            nested: self
                .virtualizer
                .entries()
                .iter()
                .any(|entry| matches!(entry, FlatEntry::Nested { .. })),
        }
    }

    // ---- scheduling ------------------------------------------------------

    /// True once no scroll or resize arrived within the settle delay.
    /// Hosts hold measurement passes until then.
    pub fn is_settled(&self, now_ms: f64) -> bool {
        now_ms - self.last_event_ms >= self.options.settle_delay_ms
    }

    pub fn needs_update(&self) -> bool {
        self.needs_flatten || self.needs_window
    }

    /// True when the rows under the viewport are not all materialized.
    pub fn window_is_stale(&self) -> bool {
        if self.needs_flatten {
            return true;
        }
        if self.virtualizer.is_empty() {
            return false;
        }
        let current = self.virtualizer.window();
        let wanted = self
            .virtualizer
            .window_for(self.viewport.scroll_top, self.viewport.body_height());
        !current.contains(wanted.first_visible) || !current.contains(wanted.last_visible)
    }

    /// Run deferred work. Returns true when the window changed and the host
    /// should render.
    ///
    /// Pending work runs once a frame has passed since the last tick that
    /// flushed, and immediately when the viewport has left the window.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.needs_update() {
            return false;
        }
        let frame_due = now_ms - self.last_flush_ms >= FRAME_INTERVAL_MS;
        if !frame_due && !self.window_is_stale() {
            return false;
        }
        self.last_flush_ms = now_ms;
        let changed = self.flush();
        if changed {
            self.emit(GridEvent::AfterRender {
                window: self.virtualizer.window(),
            });
        }
        changed
    }

    /// Bring the flattened sequence and window up to date now.
    pub fn flush(&mut self) -> bool {
        let mut changed = self.flatten_if_needed();
        if changed {
            self.rescroll();
        }
        if self.needs_window {
            self.virtualizer
                .compute_window(self.viewport.scroll_top, self.viewport.body_height());
            self.needs_window = false;
            self.measure_passes = 0;
            changed = true;
        }
        changed
    }

    fn flatten_if_needed(&mut self) -> bool {
        if !self.needs_flatten {
            return false;
        }
        let entries = flatten(FlattenSource {
            rows: &self.data.dataset().page_data,
            groups: self.data.render_groups(),
            collapsed: self.data.collapsed_groups(),
            nested_rows: self.options.has_feature(GridFeature::NestedRows),
        });
        self.virtualizer.set_entries(entries);
        self.needs_flatten = false;
        self.needs_window = true;
        true
    }

    /// Current window, computing it first when stale.
    pub fn window(&mut self) -> RowWindow {
        self.flush();
        self.virtualizer.window()
    }

    // ---- measurement -----------------------------------------------------

    /// Feed rendered heights back for the current window.
    ///
    /// Returns true when heights changed and the window was recomputed, so
    /// the host should render and measure again. Stops accepting after
    /// `maxMeasurePasses` corrections of one window.
    pub fn apply_measurements(&mut self, measured: &[(usize, f64)]) -> bool {
        if self.needs_flatten {
            tracing::debug!("Ignoring measurements for a stale flattened sequence");
            return false;
        }
        if self.measure_passes >= self.options.max_measure_passes {
            tracing::debug!(
                "Measurement pass limit {} reached; keeping current heights",
                self.options.max_measure_passes
            );
            return false;
        }
        if !self.virtualizer.apply_measurements(measured) {
            return false;
        }
        self.measure_passes += 1;
        self.virtualizer
            .compute_window(self.viewport.scroll_top, self.viewport.body_height());
        true
    }

    /// Run the whole measure/correct loop with a synchronous measurer.
    pub fn settle_measurements<F>(&mut self, measure: F) -> SettleOutcome
    where
        F: FnMut(&RowWindow, &[FlatEntry]) -> Vec<(usize, f64)>,
    {
        self.flush();
        let outcome = self
            .virtualizer
            .settle(self.viewport.scroll_top, self.viewport.body_height(), measure);
        self.measure_passes = outcome.passes;
        outcome
    }

    // ---- plugins ---------------------------------------------------------

    pub fn register_plugin(&mut self, plugin: Box<dyn GridPlugin>) {
        let ctx = PluginContext {
            columns: &self.columns,
            data: &self.data,
            scroll: self.scroll.delta(),
        };
        let commands = self.plugins.register(plugin, &ctx);
        self.run_commands(commands);
    }

    pub fn unregister_plugin(&mut self, name: &str) -> bool {
        self.plugins.unregister(name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.names()
    }

    fn run_commands(&mut self, commands: Vec<GridCommand>) {
        for command in commands {
            if let Err(e) = self.apply_command(command) {
                tracing::warn!("Plugin command failed: {}", e);
            }
        }
    }

    /// Queue `event` for plugins. Events raised while dispatching are
    /// delivered by the outer loop, up to [`MAX_EVENT_CASCADE`] in total.
    fn emit(&mut self, event: GridEvent) {
        if self.plugins.is_empty() {
            return;
        }
        self.events.push_back(event);
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        let mut delivered = 0;
        while let Some(event) = self.events.pop_front() {
            delivered += 1;
            if delivered > MAX_EVENT_CASCADE {
                tracing::warn!(
                    "Plugin events cascaded past {}; dropping {} queued",
                    MAX_EVENT_CASCADE,
                    self.events.len() + 1
                );
                self.events.clear();
                break;
            }
            tracing::trace!("Dispatching {}", event.name());
            let ctx = PluginContext {
                columns: &self.columns,
                data: &self.data,
                scroll: self.scroll.delta(),
            };
            let commands = self.plugins.dispatch(&event, &ctx);
            self.run_commands(commands);
        }
        self.dispatching = false;
    }

    pub fn apply_command(&mut self, command: GridCommand) -> Result<()> {
        match command {
            GridCommand::ApplySorting { sort_state } => self.apply_sorting(sort_state),
            GridCommand::ApplyFilter { filter_state } => self.apply_filter(filter_state),
            GridCommand::SetColumnDefs { column_defs } => self.set_column_defs(&column_defs),
            GridCommand::TogglePin { column } => {
                self.toggle_pin(&column);
                Ok(())
            }
            GridCommand::ToggleGroupBy { field } => self.toggle_group_by(&field),
            GridCommand::SelectPage { page } => self.select_page(page),
            GridCommand::RestoreState { state } => self.restore_state(state),
        }
    }

    // ---- state -----------------------------------------------------------

    pub fn save_state(&self) -> GridState {
        GridState::capture(&self.columns, &self.data)
    }

    /// Apply saved state. Columns are matched on field; sort and group
    /// entries for fields that no longer exist are dropped.
    pub fn restore_state(&mut self, state: GridState) -> Result<()> {
        let defs = restore_column_defs(&self.columns.column_defs(), &state.column_defs);
        self.columns.set_column_defs(&defs);
        let columns = &self.columns;
        let known = |field: &str| {
            let keep = columns.has_field(field);
            if !keep {
                tracing::warn!("Dropping saved state for unknown field {:?}", field);
            }
            keep
        };
        let sort_state: SortState = state
            .sort_state
            .into_iter()
            .filter(|entry| known(entry.field.as_str()))
            .collect();
        let group_by: Vec<String> = state.group_by.into_iter().filter(|f| known(f.as_str())).collect();

        let change = self
            .data
            .sync_columns(&self.columns)
            .merge(self.data.apply_sorting(sort_state))
            .merge(self.data.set_group_by(group_by));
        self.handle_change(change)?;
        self.rescroll();
        self.emit(GridEvent::AfterColumnReorder {
            columns: self.columns.leaf_ids(),
        });
        self.emit(GridEvent::AfterGroupBy {
            group_by: self.data.group_by().to_vec(),
        });
        Ok(())
    }

    // ---- rendering -------------------------------------------------------

    /// Everything the host needs to draw the current window.
    pub fn render_state(&mut self) -> RenderState {
        self.flush();
        let extents = self.extents();
        let delta = self.scroll.delta();
        let sticky = self.columns.pinned_sticky_offsets();
        let last_pinned = self.columns.last_pinned().map(|c| c.id.clone());
        let columns = self
            .columns
            .visible_leaves()
            .into_iter()
            .map(|node| RenderColumn {
                id: node.id.clone(),
                field: node.def.field.clone(),
                label: node.def.label.clone(),
                width: column_width_px(&node.def, &self.options),
                pinned: node.def.pinned,
                last_pinned: last_pinned.as_ref() == Some(&node.id),
                sticky_left: sticky
                    .iter()
                    .find(|(id, _)| *id == node.id)
                    .map(|(_, left)| *left),
            })
            .collect();
        let dataset = self.data.dataset();
        RenderState {
            window: self.virtualizer.window(),
            entries: self.virtualizer.window_entries().to_vec(),
            columns,
            header_rows: self.columns.header_rows(),
            feature_width: self.columns.feature_width_px(),
            content_width: extents.content_width,
            content_height: extents.content_height,
            scroll: delta,
            pinned: self
                .columns
                .update_pinned_column_pos(delta, self.pinned_surfaces()),
            pagination: dataset.pagination,
            total_row_count: dataset.total_row_count,
            header_row: dataset.header_row.clone(),
            footer_row: dataset.footer_row.clone(),
            filler_rows: dataset.filler_rows.clone(),
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn data(&self) -> &GridDataEngine {
        &self.data
    }

    pub fn virtualizer(&self) -> &RowVirtualizer {
        &self.virtualizer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_delta(&self) -> ScrollDelta {
        self.scroll.delta()
    }

    pub fn scroll_position(&self, surface: ScrollSurface) -> ScrollDelta {
        self.scroll.position(surface)
    }
}
