//! Row windowing over the flattened sequence.
//!
//! Heights are kept as prefix sums (`offsets[i]` is the top edge of entry
//! `i`, `offsets[n]` the total height) so window selection is two binary
//! searches.

use std::collections::HashSet;

use serde::Serialize;

use super::flatten::FlatEntry;
use super::row_heights::{HeightKey, RowHeightCache};
use crate::types::GridOptions;

/// Contiguous slice of the flattened sequence to materialize.
///
/// `start..end` always contains `first_visible..=last_visible` when the
/// sequence is non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowWindow {
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub first_visible: usize,
    pub last_visible: usize,
    /// Height of everything above `start`
    pub top_offset: f64,
    /// Height of everything from `end` on
    pub bottom_offset: f64,
    pub total_height: f64,
}

impl RowWindow {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// Result of a bounded measure/correct loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleOutcome {
    pub window: RowWindow,
    pub passes: usize,
    /// False when the pass limit was hit with heights still changing
    pub converged: bool,
}

/// Chooses which rows to materialize from scroll position and row heights.
#[derive(Debug, Clone)]
pub struct RowVirtualizer {
    entries: Vec<FlatEntry>,
    heights: RowHeightCache,
    offsets: Vec<f64>,
    buffer: usize,
    max_passes: usize,
    window: RowWindow,
}

impl Default for RowVirtualizer {
    fn default() -> Self {
        Self::new(&GridOptions::default())
    }
}

impl RowVirtualizer {
    pub fn new(options: &GridOptions) -> Self {
        Self {
            entries: Vec::new(),
            heights: RowHeightCache::new(options.row_height),
            offsets: vec![0.0],
            buffer: options.virtual_buffer,
            max_passes: options.max_measure_passes.max(1),
            window: RowWindow::default(),
        }
    }

    pub fn configure(&mut self, options: &GridOptions) {
        self.heights.set_default_height(options.row_height);
        self.buffer = options.virtual_buffer;
        self.max_passes = options.max_measure_passes.max(1);
        self.rebuild_offsets();
    }

    /// Replace the flattened sequence. Cached heights of entries that left
    /// the sequence are dropped.
    pub fn set_entries(&mut self, entries: Vec<FlatEntry>) {
        let live: HashSet<HeightKey> = entries.iter().map(FlatEntry::height_key).collect();
        self.heights.retain_keys(&live);
        self.entries = entries;
        self.rebuild_offsets();
    }

    fn rebuild_offsets(&mut self) {
        let mut offsets = Vec::with_capacity(self.entries.len() + 1);
        let mut y = 0.0;
        offsets.push(y);
        for entry in &self.entries {
            y += self.heights.get(&entry.height_key());
            offsets.push(y);
        }
        self.offsets = offsets;
    }

    pub fn entries(&self) -> &[FlatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn heights(&self) -> &RowHeightCache {
        &self.heights
    }

    pub fn buffer(&self) -> usize {
        self.buffer
    }

    pub fn total_height(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Top edge of entry `index` (total height past the end).
    pub fn offset_of(&self, index: usize) -> f64 {
        self.offsets
            .get(index)
            .copied()
            .unwrap_or_else(|| self.total_height())
    }

    pub fn height_of(&self, index: usize) -> f64 {
        self.entries
            .get(index)
            .map_or(0.0, |entry| self.heights.get(&entry.height_key()))
    }

    /// Index of the entry covering `y`: the first whose bottom edge lies
    /// strictly below `y`, clamped to the last entry.
    pub fn index_at(&self, y: f64) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        let bottoms = self.offsets.get(1..).unwrap_or(&[]);
        Some(bottoms.partition_point(|&bottom| bottom <= y).min(last))
    }

    /// Compute and remember the window for a scroll position.
    pub fn compute_window(&mut self, scroll_top: f64, viewport_height: f64) -> RowWindow {
        self.window = self.window_for(scroll_top, viewport_height);
        self.window
    }

    /// Window for a scroll position without touching state.
    pub fn window_for(&self, scroll_top: f64, viewport_height: f64) -> RowWindow {
        let total = self.total_height();
        let n = self.entries.len();
        let Some(last_index) = n.checked_sub(1) else {
            return RowWindow::default();
        };
        let scroll_top = if scroll_top.is_finite() {
            scroll_top.clamp(0.0, total)
        } else {
            0.0
        };
        let viewport_height = if viewport_height.is_finite() {
            viewport_height.max(0.0)
        } else {
            0.0
        };

        let first_visible = self.index_at(scroll_top).unwrap_or(0);
        let bottom = scroll_top + viewport_height;
        let bottoms = self.offsets.get(1..).unwrap_or(&[]);
        let last_visible = bottoms
            .partition_point(|&edge| edge < bottom)
            .min(last_index)
            .max(first_visible);

        // Buffer both ends; what cannot be used at one end goes to the other.
        let mut start = first_visible.saturating_sub(self.buffer);
        let mut end = (last_visible + 1).saturating_add(self.buffer).min(n);
        let unused_top = self.buffer - (first_visible - start);
        let unused_bottom = self.buffer - (end - (last_visible + 1));
        end = end.saturating_add(unused_top).min(n);
        start = start.saturating_sub(unused_bottom);

        RowWindow {
            start,
            end,
            first_visible,
            last_visible,
            top_offset: self.offset_of(start),
            bottom_offset: (total - self.offset_of(end)).max(0.0),
            total_height: total,
        }
    }

    /// Last computed window.
    pub fn window(&self) -> RowWindow {
        self.window
    }

    pub fn window_entries(&self) -> &[FlatEntry] {
        self.entries
            .get(self.window.start..self.window.end)
            .unwrap_or(&[])
    }

    /// Feed back rendered heights as `(entry index, height)`.
    ///
    /// Entries outside the current window and unusable heights are ignored.
    /// Returns true when any cached height changed.
    pub fn apply_measurements(&mut self, measured: &[(usize, f64)]) -> bool {
        let mut changed = false;
        for &(index, height) in measured {
            if !self.window.contains(index) {
                tracing::trace!("Ignoring measurement for entry {} outside the window", index);
                continue;
            }
            if !(height.is_finite() && height >= 0.0) {
                tracing::warn!("Ignoring invalid height {} for entry {}", height, index);
                continue;
            }
            let Some(entry) = self.entries.get(index) else {
                continue;
            };
            changed |= self.heights.set(entry.height_key(), height);
        }
        if changed {
            self.rebuild_offsets();
        }
        changed
    }

    /// Measure/correct until heights stop changing or the pass limit is hit.
    ///
    /// `measure` receives the window and its entries and returns the rendered
    /// heights, as for [`Self::apply_measurements`].
    pub fn settle<F>(&mut self, scroll_top: f64, viewport_height: f64, mut measure: F) -> SettleOutcome
    where
        F: FnMut(&RowWindow, &[FlatEntry]) -> Vec<(usize, f64)>,
    {
        let mut window = self.compute_window(scroll_top, viewport_height);
        for pass in 1..=self.max_passes {
            let measured = measure(&window, self.window_entries());
            if !self.apply_measurements(&measured) {
                return SettleOutcome {
                    window,
                    passes: pass,
                    converged: true,
                };
            }
            window = self.compute_window(scroll_top, viewport_height);
        }
        tracing::debug!(
            "Row heights still changing after {} measurement passes",
            self.max_passes
        );
        SettleOutcome {
            window,
            passes: self.max_passes,
            converged: false,
        }
    }

    /// Forget a cached height so the entry is measured afresh.
    pub fn invalidate(&mut self, key: &HeightKey) {
        if self.heights.remove(key) {
            self.rebuild_offsets();
        }
    }

    pub fn clear_heights(&mut self) {
        self.heights.clear();
        self.rebuild_offsets();
    }
}

impl Default for SettleOutcome {
    fn default() -> Self {
        Self {
            window: RowWindow::default(),
            passes: 0,
            converged: true,
        }
    }
}
