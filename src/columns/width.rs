//! Column and feature-cell width resolution.

use crate::types::{format_px, parse_px, ColumnDef, GridOptions, DEFAULT_COLUMN_WIDTH, DEFAULT_FEATURE_WIDTH};

/// Resolve a column's width.
///
/// Precedence: `dynamic_width`, `width`, the grid's `column_width`, then
/// [`DEFAULT_COLUMN_WIDTH`]. Values that are not pixel widths are skipped.
pub fn get_column_width(column: &ColumnDef, options: &GridOptions) -> String {
    let candidates = [
        column.dynamic_width.as_deref(),
        column.width.as_deref(),
        options.column_width.as_deref(),
    ];
    for candidate in candidates.into_iter().flatten() {
        if parse_px(candidate).is_some() {
            return candidate.to_string();
        }
        tracing::warn!("Column {} has unusable width {:?}", column.id, candidate);
    }
    DEFAULT_COLUMN_WIDTH.to_string()
}

/// Resolved column width in pixels.
pub fn column_width_px(column: &ColumnDef, options: &GridOptions) -> f64 {
    parse_px(&get_column_width(column, options)).unwrap_or(150.0)
}

/// Width of the feature column: one cell per feature plus a 1px border each.
pub fn get_feature_column_width(feature_count: usize, options: &GridOptions) -> String {
    format_px(feature_column_width_px(feature_count, options))
}

pub fn feature_column_width_px(feature_count: usize, options: &GridOptions) -> f64 {
    let per_feature = options.feature_width.unwrap_or(DEFAULT_FEATURE_WIDTH);
    let count = feature_count as f64;
    count * per_feature + count
}
