//! Pagination arithmetic.

use std::ops::Range;

use serde::Serialize;

/// Paging metadata shown alongside the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based
    pub current_page: usize,
    pub page_size: Option<usize>,
    pub total_pages: usize,
    pub total_rows: usize,
    /// 1-based display number of the first row on the page, 0 when empty
    pub start_row: usize,
    /// 1-based display number of the last row on the page
    pub end_row: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, None, 0)
    }
}

/// Number of pages for `total` rows, never less than 1.
pub fn total_pages(page_size: Option<usize>, total: usize) -> usize {
    match page_size {
        Some(size) if size > 0 => total.div_ceil(size).max(1),
        _ => 1,
    }
}

/// Clamp a requested page into `1..=total_pages`.
pub fn clamp_page(page: usize, page_size: Option<usize>, total: usize) -> usize {
    page.clamp(1, total_pages(page_size, total))
}

/// Row offsets `[start, end)` for `page` (1-based), bounded by `total`.
pub fn page_bounds(page: usize, page_size: Option<usize>, total: usize) -> Range<usize> {
    match page_size {
        Some(size) if size > 0 => {
            let start = page.saturating_sub(1).saturating_mul(size).min(total);
            let end = start.saturating_add(size).min(total);
            start..end
        }
        _ => 0..total,
    }
}

impl Pagination {
    pub fn new(current_page: usize, page_size: Option<usize>, total_rows: usize) -> Self {
        let current_page = clamp_page(current_page, page_size, total_rows);
        let bounds = page_bounds(current_page, page_size, total_rows);
        let (start_row, end_row) = if bounds.is_empty() {
            (0, 0)
        } else {
            (bounds.start + 1, bounds.end)
        };
        Self {
            current_page,
            page_size,
            total_pages: total_pages(page_size, total_rows),
            total_rows,
            start_row,
            end_row,
        }
    }

    /// Offsets of the current page.
    pub fn bounds(&self) -> Range<usize> {
        page_bounds(self.current_page, self.page_size, self.total_rows)
    }
}
