use serde::{Deserialize, Serialize};

/// Scroll position shared by every synchronized surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollDelta {
    pub top: f64,
    pub left: f64,
}

impl ScrollDelta {
    pub const ZERO: ScrollDelta = ScrollDelta { top: 0.0, left: 0.0 };

    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Independently scrollable regions of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollSurface {
    Header,
    Body,
    Footer,
    /// Thin pane that only carries the vertical scrollbar
    Scrollbar,
}

impl ScrollSurface {
    pub const ALL: [ScrollSurface; 4] = [
        ScrollSurface::Header,
        ScrollSurface::Body,
        ScrollSurface::Footer,
        ScrollSurface::Scrollbar,
    ];

    /// Surfaces that follow vertical scrolling.
    pub fn scrolls_vertically(self) -> bool {
        matches!(self, Self::Body | Self::Scrollbar)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            "footer" => Some(Self::Footer),
            "scrollbar" => Some(Self::Scrollbar),
            _ => None,
        }
    }
}

/// Content and viewport extents used to clamp a scroll request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollExtents {
    pub content_width: f64,
    pub content_height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub has_vertical_scrollbar: bool,
    pub scrollbar_width: f64,
}

impl ScrollExtents {
    pub fn max_scroll_top(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn max_scroll_left(&self) -> f64 {
        let scrollbar = if self.has_vertical_scrollbar {
            self.scrollbar_width
        } else {
            0.0
        };
        (self.content_width - (self.viewport_width + scrollbar)).max(0.0)
    }

    /// Clamp a requested position into `[0, max]` on both axes.
    ///
    /// Non-finite requests clamp to 0.
    pub fn clamp(&self, requested: ScrollDelta) -> ScrollDelta {
        let clamp_axis = |value: f64, max: f64| {
            if value.is_finite() {
                value.clamp(0.0, max)
            } else {
                0.0
            }
        };
        ScrollDelta {
            top: clamp_axis(requested.top, self.max_scroll_top()),
            left: clamp_axis(requested.left, self.max_scroll_left()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn extents() -> ScrollExtents {
        ScrollExtents {
            content_width: 1000.0,
            content_height: 3000.0,
            viewport_width: 400.0,
            viewport_height: 500.0,
            has_vertical_scrollbar: true,
            scrollbar_width: 17.0,
        }
    }

    #[test]
    fn test_max_scroll_accounts_for_scrollbar() {
        let e = extents();
        assert_eq!(e.max_scroll_top(), 2500.0);
        assert_eq!(e.max_scroll_left(), 583.0);
        let e = ScrollExtents {
            has_vertical_scrollbar: false,
            ..extents()
        };
        assert_eq!(e.max_scroll_left(), 600.0);
    }

    #[test]
    fn test_small_content_never_scrolls() {
        let e = ScrollExtents {
            content_width: 100.0,
            content_height: 100.0,
            ..extents()
        };
        assert_eq!(e.clamp(ScrollDelta::new(50.0, 50.0)), ScrollDelta::ZERO);
    }

    #[test]
    fn test_clamp_handles_nan() {
        let clamped = extents().clamp(ScrollDelta::new(f64::NAN, f64::INFINITY));
        assert_eq!(clamped, ScrollDelta::ZERO);
    }
}
