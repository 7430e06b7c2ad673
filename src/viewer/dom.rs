//! DOM side of scroll synchronization (wasm32 only).
//!
//! The host owns the header, body, footer and scrollbar elements; the grid
//! listens to their native scroll/wheel events and writes the shared position
//! back. Pinned cells are found by their `data-pinned-col` attribute.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, Event, HtmlElement, WheelEvent};

use super::scroll::ScrollUpdate;
use super::{DataGrid, SharedState};
use crate::types::{ScrollDelta, ScrollSurface};

/// Attribute carrying the column id on every pinned header/body/footer cell
pub const PINNED_COLUMN_ATTR: &str = "data-pinned-col";

fn read_f64(element: &Element, property: &str) -> f64 {
    Reflect::get(element.as_ref(), &JsValue::from_str(property))
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

fn write_f64(element: &Element, property: &str, value: f64) {
    let _ = Reflect::set(
        element.as_ref(),
        &JsValue::from_str(property),
        &JsValue::from_f64(value),
    );
}

/// Native scroll position of `element`, fractional where the browser has it.
pub(crate) fn native_scroll(element: &Element) -> ScrollDelta {
    ScrollDelta::new(read_f64(element, "scrollTop"), read_f64(element, "scrollLeft"))
}

/// The host elements making up one grid
#[derive(Default)]
pub(crate) struct GridSurfaces {
    pub(crate) header: Option<HtmlElement>,
    pub(crate) body: Option<HtmlElement>,
    pub(crate) footer: Option<HtmlElement>,
    pub(crate) scrollbar: Option<HtmlElement>,
}

impl GridSurfaces {
    pub(crate) fn get(&self, surface: ScrollSurface) -> Option<&HtmlElement> {
        match surface {
            ScrollSurface::Header => self.header.as_ref(),
            ScrollSurface::Body => self.body.as_ref(),
            ScrollSurface::Footer => self.footer.as_ref(),
            ScrollSurface::Scrollbar => self.scrollbar.as_ref(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (ScrollSurface, &HtmlElement)> {
        ScrollSurface::ALL
            .into_iter()
            .filter_map(move |surface| self.get(surface).map(|el| (surface, el)))
    }
}

/// Write one completed scroll cycle to the DOM: positions first, then the
/// pinned-cell offsets.
pub(crate) fn apply_scroll_update(surfaces: &GridSurfaces, update: &ScrollUpdate) {
    for write in &update.surfaces {
        let Some(element) = surfaces.get(write.surface) else {
            continue;
        };
        write_f64(element, "scrollLeft", write.left);
        if let Some(top) = write.top {
            write_f64(element, "scrollTop", top);
        }
    }

    let transform = format!("translateX({}px)", update.pinned.translate_x);
    let selector = format!("[{PINNED_COLUMN_ATTR}]");
    for (_, element) in surfaces.iter() {
        let Ok(nodes) = element.query_selector_all(&selector) else {
            continue;
        };
        for i in 0..nodes.length() {
            let Some(cell) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let _ = cell.style().set_property("transform", &transform);
        }
    }
}

/// An event listener that unregisters itself when dropped.
pub(crate) struct SurfaceListener {
    element: HtmlElement,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for SurfaceListener {
    fn drop(&mut self) {
        let _ = self
            .element
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Follow native scrolling of one surface.
pub(crate) fn listen_scroll(
    state: &Rc<RefCell<SharedState>>,
    surface: ScrollSurface,
    element: &HtmlElement,
) -> Option<SurfaceListener> {
    let weak_state = Rc::downgrade(state);
    let target = element.clone();
    let callback = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(state) = weak_state.upgrade() {
            DataGrid::handle_surface_scroll(&state, surface, native_scroll(&target));
        }
    }) as Box<dyn FnMut(Event)>);
    element
        .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref())
        .ok()?;
    Some(SurfaceListener {
        element: element.clone(),
        event: "scroll",
        callback,
    })
}

/// Turn wheel input over a surface that cannot scroll itself into grid
/// scrolling. Registered non-passive so the native action can be cancelled.
pub(crate) fn listen_wheel(state: &Rc<RefCell<SharedState>>, element: &HtmlElement) -> Option<SurfaceListener> {
    let weak_state = Rc::downgrade(state);
    let callback = Closure::wrap(Box::new(move |event: Event| {
        let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
            return;
        };
        if let Some(state) = weak_state.upgrade() {
            wheel.prevent_default();
            DataGrid::handle_wheel(&state, wheel.delta_x(), wheel.delta_y());
        }
    }) as Box<dyn FnMut(Event)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    element
        .add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            callback.as_ref().unchecked_ref(),
            &options,
        )
        .ok()?;
    Some(SurfaceListener {
        element: element.clone(),
        event: "wheel",
        callback,
    })
}
