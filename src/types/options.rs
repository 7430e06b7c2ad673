use serde::{Deserialize, Serialize};

use super::{parse_px, ColumnDef};

/// Default row height in pixels for rows that have not been measured
pub const DEFAULT_ROW_HEIGHT: f64 = 30.0;

/// Rows rendered beyond each edge of the viewport
pub const DEFAULT_VIRTUAL_BUFFER: usize = 10;

/// Width of one feature cell (checkbox, expander, row number)
pub const DEFAULT_FEATURE_WIDTH: f64 = 26.0;

/// Fallback width when neither the column nor the grid sets one
pub const DEFAULT_COLUMN_WIDTH: &str = "150px";

pub const DEFAULT_SCROLLBAR_WIDTH: f64 = 17.0;
pub const DEFAULT_WHEEL_GUARD_MS: f64 = 50.0;
pub const DEFAULT_SETTLE_DELAY_MS: f64 = 100.0;
pub const DEFAULT_MAX_MEASURE_PASSES: usize = 8;

/// Minimum spacing of window recomputations while scrolling (one 60Hz frame)
pub const FRAME_INTERVAL_MS: f64 = 16.0;

/// Per-row feature cells rendered ahead of the data columns
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GridFeature {
    Selection,
    RowNumber,
    NestedRows,
}

/// Grid-wide configuration, deserialized from the host's options object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    /// Default width for columns without their own, e.g. "120px"
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column_width: Option<String>,
    /// Width of one feature cell in pixels
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_width: Option<f64>,
    #[serde(default)]
    pub features: Vec<GridFeature>,
    /// Rows per page; absent disables client-side paging
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_size: Option<usize>,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_virtual_buffer")]
    pub virtual_buffer: usize,
    #[serde(default = "default_scrollbar_width")]
    pub scrollbar_width: f64,
    /// Pad a short page with filler rows up to `page_size`
    #[serde(default)]
    pub filler_rows: bool,
    #[serde(default)]
    pub header_height: f64,
    #[serde(default)]
    pub footer_height: f64,
    #[serde(default = "default_wheel_guard_ms")]
    pub wheel_guard_ms: f64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: f64,
    #[serde(default = "default_max_measure_passes")]
    pub max_measure_passes: usize,
    /// Field whose value identifies a record across reloads
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row_key: Option<String>,
}

fn default_row_height() -> f64 {
    DEFAULT_ROW_HEIGHT
}

fn default_virtual_buffer() -> usize {
    DEFAULT_VIRTUAL_BUFFER
}

fn default_scrollbar_width() -> f64 {
    DEFAULT_SCROLLBAR_WIDTH
}

fn default_wheel_guard_ms() -> f64 {
    DEFAULT_WHEEL_GUARD_MS
}

fn default_settle_delay_ms() -> f64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_max_measure_passes() -> usize {
    DEFAULT_MAX_MEASURE_PASSES
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            column_width: None,
            feature_width: None,
            features: Vec::new(),
            page_size: None,
            row_height: DEFAULT_ROW_HEIGHT,
            virtual_buffer: DEFAULT_VIRTUAL_BUFFER,
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
            filler_rows: false,
            header_height: 0.0,
            footer_height: 0.0,
            wheel_guard_ms: DEFAULT_WHEEL_GUARD_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            max_measure_passes: DEFAULT_MAX_MEASURE_PASSES,
            row_key: None,
        }
    }
}

impl GridOptions {
    /// Parse options JSON, falling back to defaults when it is malformed.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<GridOptions>(json) {
            Ok(options) => options.sanitized(),
            Err(e) => {
                tracing::warn!("Ignoring malformed grid options: {}", e);
                Self::default()
            }
        }
    }

    /// Copy with every invalid value replaced by its default.
    pub fn sanitized(mut self) -> Self {
        if self.page_size == Some(0) {
            tracing::warn!("pageSize must be positive; client paging disabled");
            self.page_size = None;
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            tracing::warn!(
                "rowHeight {} is invalid; using {}",
                self.row_height,
                DEFAULT_ROW_HEIGHT
            );
            self.row_height = DEFAULT_ROW_HEIGHT;
        }
        if let Some(width) = self.feature_width {
            if !(width.is_finite() && width >= 0.0) {
                tracing::warn!("featureWidth {} is invalid; using default", width);
                self.feature_width = None;
            }
        }
        if let Some(width) = &self.column_width {
            if parse_px(width).is_none() {
                tracing::warn!("columnWidth {:?} is not a pixel width; ignoring", width);
                self.column_width = None;
            }
        }
        if !(self.scrollbar_width.is_finite() && self.scrollbar_width >= 0.0) {
            self.scrollbar_width = DEFAULT_SCROLLBAR_WIDTH;
        }
        for (value, name) in [
            (&mut self.header_height, "headerHeight"),
            (&mut self.footer_height, "footerHeight"),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                tracing::warn!("{} {} is invalid; using 0", name, value);
                *value = 0.0;
            }
        }
        if !(self.wheel_guard_ms.is_finite() && self.wheel_guard_ms >= 0.0) {
            self.wheel_guard_ms = DEFAULT_WHEEL_GUARD_MS;
        }
        if !(self.settle_delay_ms.is_finite() && self.settle_delay_ms >= 0.0) {
            self.settle_delay_ms = DEFAULT_SETTLE_DELAY_MS;
        }
        if self.max_measure_passes == 0 {
            tracing::warn!("maxMeasurePasses must be at least 1");
            self.max_measure_passes = 1;
        }
        self
    }

    /// Number of feature cells rendered per row.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn has_feature(&self, feature: GridFeature) -> bool {
        self.features.contains(&feature)
    }
}
