//! Viewport state: size of the grid's scrollable region and its position.

use crate::types::{ScrollDelta, ScrollExtents};

/// The visible area of the grid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_left: f64,
    /// Vertical scroll position in content coordinates
    pub scroll_top: f64,
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels, header and footer included
    pub height: f64,
    pub header_height: f64,
    pub footer_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            width: 800.0,
            height: 600.0,
            header_height: 0.0,
            footer_height: 0.0,
        }
    }

    /// Height left for body rows once header and footer are placed.
    pub fn body_height(&self) -> f64 {
        (self.height - self.header_height - self.footer_height).max(0.0)
    }

    /// True when rows overflow the body vertically.
    pub fn has_vertical_scrollbar(&self, content_height: f64) -> bool {
        content_height > self.body_height()
    }

    /// Clamping bounds for the given content size.
    pub fn extents(&self, content_width: f64, content_height: f64, scrollbar_width: f64) -> ScrollExtents {
        ScrollExtents {
            content_width,
            content_height,
            viewport_width: self.width,
            viewport_height: self.body_height(),
            has_vertical_scrollbar: self.has_vertical_scrollbar(content_height),
            scrollbar_width,
        }
    }

    pub fn position(&self) -> ScrollDelta {
        ScrollDelta::new(self.scroll_top, self.scroll_left)
    }

    /// Set absolute scroll position, clamped into `extents`.
    pub fn set_scroll(&mut self, requested: ScrollDelta, extents: &ScrollExtents) -> ScrollDelta {
        let clamped = extents.clamp(requested);
        self.scroll_top = clamped.top;
        self.scroll_left = clamped.left;
        clamped
    }

    /// Scroll by delta amounts, clamped into `extents`.
    pub fn scroll_by(&mut self, delta_left: f64, delta_top: f64, extents: &ScrollExtents) -> ScrollDelta {
        let requested = ScrollDelta::new(self.scroll_top + delta_top, self.scroll_left + delta_left);
        self.set_scroll(requested, extents)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn set_chrome_heights(&mut self, header_height: f64, footer_height: f64) {
        self.header_height = header_height.max(0.0);
        self.footer_height = footer_height.max(0.0);
    }
}
