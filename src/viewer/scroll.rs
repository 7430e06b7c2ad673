//! Scroll synchronization across the grid's surfaces.
//!
//! Includes the `ScrollCoordinator` (clamp, broadcast, pinned reposition,
//! notify) plus per-event window updates and the settle timeout for `DataGrid`.

use serde::Serialize;

use crate::columns::{ColumnLayout, PinnedLayout, PinnedSurfaces};
use crate::types::{ScrollDelta, ScrollExtents, ScrollSurface, DEFAULT_WHEEL_GUARD_MS};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use super::{now_ms, DataGrid, SharedState};

/// Position written to one surface during a scroll cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceScroll {
    pub surface: ScrollSurface,
    /// Absent for surfaces that do not scroll vertically
    pub top: Option<f64>,
    pub left: f64,
}

/// Everything one `scroll_grid` cycle did, in the order it did it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollUpdate {
    pub source: Option<ScrollSurface>,
    pub requested: ScrollDelta,
    /// Clamped position now shared by every surface
    pub delta: ScrollDelta,
    pub surfaces: Vec<SurfaceScroll>,
    pub pinned: PinnedLayout,
    /// Position differs from the previous cycle
    pub changed: bool,
}

/// Handle returned by [`ScrollCoordinator::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type ScrollSubscriber = Box<dyn FnMut(&ScrollUpdate)>;

/// Owns the authoritative scroll delta and keeps every surface in step.
pub struct ScrollCoordinator {
    delta: ScrollDelta,
    positions: [ScrollDelta; 4],
    subscribers: Vec<(SubscriptionId, ScrollSubscriber)>,
    next_subscription: u64,
    wheel_guard_ms: f64,
    /// Wheel input is ignored until this timestamp
    wheel_locked_until: Option<f64>,
}

impl std::fmt::Debug for ScrollCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollCoordinator")
            .field("delta", &self.delta)
            .field("positions", &self.positions)
            .field("subscribers", &self.subscribers.len())
            .field("wheel_guard_ms", &self.wheel_guard_ms)
            .finish_non_exhaustive()
    }
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_WHEEL_GUARD_MS)
    }
}

fn surface_slot(surface: ScrollSurface) -> usize {
    match surface {
        ScrollSurface::Header => 0,
        ScrollSurface::Body => 1,
        ScrollSurface::Footer => 2,
        ScrollSurface::Scrollbar => 3,
    }
}

impl ScrollCoordinator {
    pub fn new(wheel_guard_ms: f64) -> Self {
        Self {
            delta: ScrollDelta::ZERO,
            positions: [ScrollDelta::ZERO; 4],
            subscribers: Vec::new(),
            next_subscription: 0,
            wheel_guard_ms,
            wheel_locked_until: None,
        }
    }

    pub fn set_wheel_guard_ms(&mut self, guard_ms: f64) {
        self.wheel_guard_ms = guard_ms;
    }

    /// Current authoritative scroll position.
    pub fn delta(&self) -> ScrollDelta {
        self.delta
    }

    /// Position last written to `surface`.
    pub fn position(&self, surface: ScrollSurface) -> ScrollDelta {
        self.positions
            .get(surface_slot(surface))
            .copied()
            .unwrap_or(ScrollDelta::ZERO)
    }

    pub fn subscribe(&mut self, subscriber: ScrollSubscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Run one scroll cycle: clamp, write every surface but the source,
    /// reposition pinned columns, then notify subscribers.
    ///
    /// Horizontal offset goes to every other surface; vertical offset only
    /// to the body and the scrollbar pane. `source` of `None` writes all.
    pub fn scroll_grid(
        &mut self,
        source: Option<ScrollSurface>,
        requested: ScrollDelta,
        extents: &ScrollExtents,
        layout: &ColumnLayout,
        pinned_surfaces: PinnedSurfaces,
    ) -> ScrollUpdate {
        let delta = extents.clamp(requested);
        let changed = delta != self.delta;

        let mut surfaces = Vec::with_capacity(ScrollSurface::ALL.len());
        for surface in ScrollSurface::ALL {
            let Some(slot) = self.positions.get_mut(surface_slot(surface)) else {
                continue;
            };
            if Some(surface) == source {
                // The source already shows its own native position.
                *slot = delta;
                continue;
            }
            let top = surface.scrolls_vertically().then_some(delta.top);
            slot.left = delta.left;
            if let Some(top) = top {
                slot.top = top;
            }
            surfaces.push(SurfaceScroll {
                surface,
                top,
                left: delta.left,
            });
        }

        let pinned = layout.update_pinned_column_pos(delta, pinned_surfaces);
        self.delta = delta;

        let update = ScrollUpdate {
            source,
            requested,
            delta,
            surfaces,
            pinned,
            changed,
        };
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&update);
        }
        update
    }

    /// Apply a raw wheel delta on top of the current position.
    ///
    /// Returns `None` while a previous wheel update is still inside the
    /// guard window, so overlapping wheel events cannot compound.
    #[allow(clippy::too_many_arguments)]
    pub fn on_wheel(
        &mut self,
        source: Option<ScrollSurface>,
        delta_x: f64,
        delta_y: f64,
        now_ms: f64,
        extents: &ScrollExtents,
        layout: &ColumnLayout,
        pinned_surfaces: PinnedSurfaces,
    ) -> Option<ScrollUpdate> {
        if self.wheel_locked_until.is_some_and(|until| now_ms < until) {
            tracing::trace!("Wheel event inside guard window dropped");
            return None;
        }
        self.wheel_locked_until = Some(now_ms + self.wheel_guard_ms);
        let dx = if delta_x.is_finite() { delta_x } else { 0.0 };
        let dy = if delta_y.is_finite() { delta_y } else { 0.0 };
        let requested = ScrollDelta::new(self.delta.top + dy, self.delta.left + dx);
        Some(self.scroll_grid(source, requested, extents, layout, pinned_surfaces))
    }

    /// Return every surface to (0, 0).
    pub fn reset(
        &mut self,
        extents: &ScrollExtents,
        layout: &ColumnLayout,
        pinned_surfaces: PinnedSurfaces,
    ) -> ScrollUpdate {
        self.wheel_locked_until = None;
        self.scroll_grid(None, ScrollDelta::ZERO, extents, layout, pinned_surfaces)
    }
}

// ============================================================================
// Settle scheduling (wasm32 only)
// ============================================================================

#[cfg(target_arch = "wasm32")]
impl DataGrid {
    /// Move the window if a frame has passed or the viewport left it, then
    /// restart the settle timer for the measurement render.
    pub(crate) fn after_scroll_event(state: &Rc<RefCell<SharedState>>) {
        let callback = {
            let mut s = state.borrow_mut();
            if s.context.tick(now_ms()) {
                s.render_callback.clone()
            } else {
                None
            }
        };
        Self::invoke_render_callback(callback);
        Self::schedule_settle_timeout(state);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn schedule_settle_timeout(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(timer_id) = s.settle_timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        if s.settle_closure.is_none() {
            let weak_state = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    DataGrid::handle_settle(&state);
                }
            }) as Box<dyn FnMut()>);
            s.settle_closure = Some(closure);
        }
        let delay = s.context.options().settle_delay_ms.round();
        let delay = i32::try_from(delay as i64).unwrap_or(i32::MAX);
        let Some(callback) = s.settle_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => s.settle_timer = Some(id),
            Err(_) => s.settle_timer = None,
        }
    }

    pub(crate) fn handle_settle(state: &Rc<RefCell<SharedState>>) {
        let callback = {
            let mut s = state.borrow_mut();
            s.settle_timer = None;
            let now = now_ms();
            if !s.context.is_settled(now) {
                drop(s);
                Self::schedule_settle_timeout(state);
                return;
            }
            // Settled: render once more so the host measures the resting window.
            s.context.tick(now);
            s.render_callback.clone()
        };
        Self::invoke_render_callback(callback);
    }
}
