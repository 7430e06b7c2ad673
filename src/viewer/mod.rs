//! `DataGrid` - the WASM-exported handle for one grid instance.
//!
//! This module provides:
//! - The per-grid [`GridContext`] tying columns, data, windowing and scrolling
//! - Scroll synchronization across header, body, footer and scrollbar panes
//! - Settle scheduling so window recomputation runs once scrolling pauses
//! - JSON in/out bindings for the render host
//!
//! Scroll and wheel listeners are registered by [`DataGrid::attach`]; the host
//! only renders what `render_state` returns and reports measured heights.

mod context;
#[cfg(target_arch = "wasm32")]
mod dom;
mod scroll;

pub use context::{GridContext, RenderColumn, RenderState, MAX_EVENT_CASCADE};
pub use scroll::{
    ScrollCoordinator, ScrollSubscriber, ScrollUpdate, SubscriptionId, SurfaceScroll,
};

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use serde::Serialize;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlElement;

#[cfg(target_arch = "wasm32")]
use crate::data::DataResponse;
#[cfg(target_arch = "wasm32")]
use crate::error::GridError;
#[cfg(target_arch = "wasm32")]
use crate::state::GridState;
use crate::types::GridOptions;
#[cfg(target_arch = "wasm32")]
use crate::types::{ColumnId, GroupPath, RowId, ScrollDelta, ScrollSurface};

/// Shared state reachable from DOM event handlers (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    pub(crate) context: GridContext,
    pub(crate) render_callback: Option<Function>,
    pub(crate) settle_timer: Option<i32>,
    pub(crate) settle_closure: Option<Closure<dyn FnMut()>>,
    /// Scroll subscriber that writes positions to the attached surfaces
    pub(crate) dom_subscription: Option<SubscriptionId>,
}

// Timing helper for event timestamps.
#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

#[cfg(target_arch = "wasm32")]
fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| GridError::from(e).into())
}

#[cfg(target_arch = "wasm32")]
fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| GridError::from(e).into())
}

/// The grid handle exported to JavaScript
#[wasm_bindgen]
pub struct DataGrid {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<SharedState>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)] // Dropping a listener unregisters it
    listeners: Vec<dom::SurfaceListener>,

    #[cfg(not(target_arch = "wasm32"))]
    context: GridContext,
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl DataGrid {
    /// Create a grid from an options object (`undefined` for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<DataGrid, JsValue> {
        console_error_panic_hook::set_once();

        let options: GridOptions = if options.is_undefined() || options.is_null() {
            GridOptions::default()
        } else {
            from_js(options)?
        };
        let state = Rc::new(RefCell::new(SharedState {
            context: GridContext::new(options),
            render_callback: None,
            settle_timer: None,
            settle_closure: None,
            dom_subscription: None,
        }));
        Ok(DataGrid {
            state,
            listeners: Vec::new(),
        })
    }

    /// Bind the grid to its host elements. Header and footer receive wheel
    /// input on behalf of the body; every present surface is kept in sync.
    pub fn attach(
        &mut self,
        header: Option<HtmlElement>,
        body: HtmlElement,
        footer: Option<HtmlElement>,
        scrollbar: Option<HtmlElement>,
    ) {
        self.listeners.clear();
        let surfaces = dom::GridSurfaces {
            header,
            body: Some(body),
            footer,
            scrollbar,
        };

        for surface in ScrollSurface::ALL {
            let Some(element) = surfaces.get(surface) else {
                continue;
            };
            if let Some(listener) = dom::listen_scroll(&self.state, surface, element) {
                self.listeners.push(listener);
            }
            if !surface.scrolls_vertically() {
                if let Some(listener) = dom::listen_wheel(&self.state, element) {
                    self.listeners.push(listener);
                }
            }
        }

        let mut s = self.state.borrow_mut();
        if let Some(previous) = s.dom_subscription.take() {
            s.context.unsubscribe_scroll(previous);
        }
        let id = s.context.subscribe_scroll(Box::new(move |update: &ScrollUpdate| {
            dom::apply_scroll_update(&surfaces, update);
        }));
        s.dom_subscription = Some(id);
        let delta = s.context.scroll_delta();
        s.context.scroll_to(None, delta, now_ms());
    }

    /// Register a JS callback invoked whenever the host should render.
    pub fn set_render_callback(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().render_callback = callback;
    }

    pub(crate) fn invoke_render_callback(callback: Option<Function>) {
        if let Some(callback) = callback {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    /// Run `f` against the context, then ask the host to render if anything
    /// became stale.
    fn mutate<T>(&self, f: impl FnOnce(&mut GridContext) -> T) -> T {
        let (out, callback) = {
            let mut s = self.state.borrow_mut();
            let out = f(&mut s.context);
            let stale = s.context.needs_update() || s.context.has_pending_request();
            (out, if stale { s.render_callback.clone() } else { None })
        };
        Self::invoke_render_callback(callback);
        out
    }

    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: GridOptions = from_js(options)?;
        Ok(self.mutate(|ctx| ctx.set_options(options))?)
    }

    /// Replace the rows. With `total_count` the rows are the current server page.
    pub fn set_data(&mut self, rows: JsValue, total_count: Option<usize>) -> Result<(), JsValue> {
        let rows: Vec<serde_json::Value> = from_js(rows)?;
        Ok(self.mutate(|ctx| ctx.set_data(rows, total_count))?)
    }

    pub fn set_column_defs(&mut self, defs: JsValue) -> Result<(), JsValue> {
        let defs: Vec<crate::types::ColumnDef> = from_js(defs)?;
        Ok(self.mutate(|ctx| ctx.set_column_defs(&defs))?)
    }

    pub fn apply_sorting(&mut self, sort_state: JsValue) -> Result<(), JsValue> {
        let sort_state = from_js(sort_state)?;
        Ok(self.mutate(|ctx| ctx.apply_sorting(sort_state))?)
    }

    pub fn apply_filter(&mut self, filter_state: JsValue) -> Result<(), JsValue> {
        let filter_state = from_js(filter_state)?;
        Ok(self.mutate(|ctx| ctx.apply_filter(filter_state))?)
    }

    pub fn add_group_by_column(&mut self, field: &str) -> Result<(), JsValue> {
        Ok(self.mutate(|ctx| ctx.add_group_by_column(field))?)
    }

    pub fn remove_group_by_column(&mut self, field: &str) -> Result<(), JsValue> {
        Ok(self.mutate(|ctx| ctx.remove_group_by_column(field))?)
    }

    pub fn toggle_group_by(&mut self, field: &str) -> Result<(), JsValue> {
        Ok(self.mutate(|ctx| ctx.toggle_group_by(field))?)
    }

    /// Go to a 1-based page.
    pub fn select_page(&mut self, page: usize) -> Result<(), JsValue> {
        Ok(self.mutate(|ctx| ctx.select_page(page))?)
    }

    /// Expand or collapse the group at `path` (outermost key first).
    /// Returns true when the group is now expanded.
    pub fn toggle_group(&mut self, path: Vec<String>) -> Result<bool, JsValue> {
        let path = GroupPath(path);
        self.mutate(|ctx| ctx.toggle_group(&path))
            .ok_or_else(|| GridError::UnknownGroup(path.0.join(" / ")).into())
    }

    pub fn expand_all_groups(&mut self) {
        self.mutate(GridContext::expand_all_groups);
    }

    pub fn collapse_all_groups(&mut self) {
        self.mutate(GridContext::collapse_all_groups);
    }

    pub fn toggle_selected(&mut self, row_id: u64) -> Option<bool> {
        self.mutate(|ctx| ctx.toggle_selected(RowId(row_id)))
    }

    pub fn select_all(&mut self, selected: bool) {
        self.mutate(|ctx| ctx.select_all(selected));
    }

    pub fn toggle_nested(&mut self, row_id: u64) -> Option<bool> {
        self.mutate(|ctx| ctx.toggle_nested(RowId(row_id)))
    }

    pub fn selected_ids(&self) -> Vec<u64> {
        self.state
            .borrow()
            .context
            .data()
            .selected_ids()
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    pub fn toggle_pin(&mut self, column: &str) -> Result<(), JsValue> {
        if self.mutate(|ctx| ctx.toggle_pin(&ColumnId::new(column))) {
            Ok(())
        } else {
            Err(GridError::UnknownColumn(column.to_string()).into())
        }
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) -> bool {
        self.mutate(|ctx| ctx.set_column_visible(&ColumnId::new(column), visible))
    }

    pub fn set_column_width(&mut self, column: &str, width: &str) -> bool {
        self.mutate(|ctx| ctx.set_column_width(&ColumnId::new(column), width))
    }

    pub fn move_column(&mut self, column: &str, to_index: usize) -> bool {
        self.mutate(|ctx| ctx.move_column(&ColumnId::new(column), to_index))
    }

    /// Viewport size in CSS pixels, header and footer included.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.state.borrow_mut().context.resize(width, height, now_ms());
        Self::after_scroll_event(&self.state);
    }

    /// Programmatic scroll of every surface.
    pub fn scroll_to(&mut self, top: f64, left: f64) {
        self.state
            .borrow_mut()
            .context
            .scroll_to(None, ScrollDelta::new(top, left), now_ms());
        Self::after_scroll_event(&self.state);
    }

    /// Run deferred work that is due. Returns true when the host should render.
    pub fn tick(&mut self) -> bool {
        self.state.borrow_mut().context.tick(now_ms())
    }

    /// Feed back `[[entryIndex, height], ...]` for the rendered window.
    /// Returns true when the host should render and measure again.
    pub fn apply_measurements(&mut self, measured: JsValue) -> Result<bool, JsValue> {
        let measured: Vec<(usize, f64)> = from_js(measured)?;
        let (changed, callback) = {
            let mut s = self.state.borrow_mut();
            let changed = s.context.apply_measurements(&measured);
            (changed, if changed { s.render_callback.clone() } else { None })
        };
        Self::invoke_render_callback(callback);
        Ok(changed)
    }

    /// Current window, columns and offsets as JSON.
    pub fn render_state(&mut self) -> Result<String, JsValue> {
        let state = self.state.borrow_mut().context.render_state();
        to_json(&state)
    }

    pub fn save_state(&self) -> Result<String, JsValue> {
        to_json(&self.state.borrow().context.save_state())
    }

    pub fn restore_state(&mut self, json: &str) -> Result<(), JsValue> {
        let state = GridState::from_json(json)?;
        Ok(self.mutate(|ctx| ctx.restore_state(state))?)
    }

    /// Switch between local processing and an asynchronous remote source
    /// driven through [`DataGrid::fetch_pending`].
    pub fn set_remote(&mut self, enabled: bool) -> Result<(), JsValue> {
        Ok(self.mutate(|ctx| ctx.set_remote(enabled))?)
    }

    /// Issue the pending remote request, if any, through `fetcher`
    /// (`request => Promise<{ data, totalCount }>`). Resolves to true when a
    /// request was made. Responses overtaken by a newer request are dropped.
    pub fn fetch_pending(&self, fetcher: Function) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        wasm_bindgen_futures::future_to_promise(async move {
            let pending = state.borrow_mut().context.take_pending_request();
            let Some(pending) = pending else {
                return Ok(JsValue::FALSE);
            };
            let request = pending
                .request
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(GridError::from)?;

            let outcome: Result<DataResponse, JsValue> = async {
                let returned = fetcher.call1(&JsValue::NULL, &request)?;
                let resolved = JsFuture::from(js_sys::Promise::resolve(&returned)).await?;
                from_js(resolved)
            }
            .await;
            let response = outcome.map_err(|e| {
                GridError::Remote(e.as_string().unwrap_or_else(|| format!("{e:?}")))
            });

            let callback = {
                let mut s = state.borrow_mut();
                s.context.apply_remote_response(pending.generation, response)?;
                s.render_callback.clone()
            };
            DataGrid::invoke_render_callback(callback);
            Ok(JsValue::TRUE)
        })
    }

    pub fn has_pending_request(&self) -> bool {
        self.state.borrow().context.has_pending_request()
    }
}

#[cfg(target_arch = "wasm32")]
impl DataGrid {
    pub(crate) fn handle_surface_scroll(
        state: &Rc<RefCell<SharedState>>,
        surface: ScrollSurface,
        native: ScrollDelta,
    ) {
        {
            let mut s = state.borrow_mut();
            let current = s.context.scroll_delta();
            let top = if surface.scrolls_vertically() {
                native.top
            } else {
                current.top
            };
            let requested = ScrollDelta::new(top, native.left);
            // Echo of a position this grid just wrote.
            if requested == current {
                return;
            }
            s.context.scroll_to(Some(surface), requested, now_ms());
        }
        Self::after_scroll_event(state);
    }

    pub(crate) fn handle_wheel(state: &Rc<RefCell<SharedState>>, delta_x: f64, delta_y: f64) {
        let applied = state
            .borrow_mut()
            .context
            .wheel(None, delta_x, delta_y, now_ms())
            .is_some();
        if applied {
            Self::after_scroll_event(state);
        }
    }
}

// ============================================================================
// Non-WASM32 Implementation (for testing/CLI)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl DataGrid {
    /// Create a grid without DOM bindings.
    pub fn new_headless(options: GridOptions) -> Self {
        DataGrid {
            context: GridContext::new(options),
        }
    }

    pub fn context(&self) -> &GridContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GridContext {
        &mut self.context
    }

    /// Current render state as JSON.
    pub fn render_state(&mut self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(&self.context.render_state())?)
    }
}
