//! Column layout engine.
//!
//! This module handles:
//! - Flattening hierarchical column definitions into leaves
//! - Resolving column and feature-cell widths
//! - Pinned-column ordering and the scroll compensation for pinned elements
//! - Header rows with colspan/rowspan for grouped headers
//! - In-place layout edits (pin, visibility, width, reorder)

mod header;
mod pinned;
mod tree;
mod width;

pub use header::{header_rows, HeaderCell};
pub use pinned::{
    normalize_pinned, pinned_leaves, PinnedLayout, PinnedPlacement, PinnedSurface, PinnedSurfaces,
};
pub use tree::{ColumnNode, ColumnTree, NodeIdx};
pub use width::{
    column_width_px, feature_column_width_px, get_column_width, get_feature_column_width,
};

use crate::types::{ColumnDef, ColumnId, GridOptions, ScrollDelta};

/// Depth-first collection of leaf columns, order preserving.
pub fn flatten_columns(tree: &ColumnTree) -> Vec<&ColumnNode> {
    tree.leaves()
        .into_iter()
        .filter_map(|idx| tree.node(idx))
        .collect()
}

/// Column tree plus the grid options that drive width resolution
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    tree: ColumnTree,
    options: GridOptions,
}

impl ColumnLayout {
    pub fn new(defs: &[ColumnDef], options: &GridOptions) -> Self {
        let mut layout = Self {
            tree: ColumnTree::from_defs(defs),
            options: options.clone(),
        };
        normalize_pinned(&mut layout.tree);
        layout
    }

    /// Replace every column definition.
    pub fn set_column_defs(&mut self, defs: &[ColumnDef]) {
        self.tree = ColumnTree::from_defs(defs);
        normalize_pinned(&mut self.tree);
    }

    pub fn set_options(&mut self, options: &GridOptions) {
        self.options = options.clone();
    }

    pub fn tree(&self) -> &ColumnTree {
        &self.tree
    }

    /// Nested definitions in current display order.
    pub fn column_defs(&self) -> Vec<ColumnDef> {
        self.tree.to_defs()
    }

    pub fn leaves(&self) -> Vec<&ColumnNode> {
        flatten_columns(&self.tree)
    }

    pub fn visible_leaves(&self) -> Vec<&ColumnNode> {
        self.leaves().into_iter().filter(|n| n.def.visible).collect()
    }

    /// Ids of all leaf columns, in display order.
    pub fn leaf_ids(&self) -> Vec<ColumnId> {
        self.leaves().into_iter().map(|n| n.id.clone()).collect()
    }

    /// Fields bound by leaf columns, in display order.
    pub fn leaf_fields(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .filter_map(|n| n.def.field.clone())
            .collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.tree.find_by_field(field).is_some()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnNode> {
        self.tree.find(id).and_then(|idx| self.tree.node(idx))
    }

    pub fn column_by_field(&self, field: &str) -> Option<&ColumnNode> {
        self.tree.find_by_field(field).and_then(|idx| self.tree.node(idx))
    }

    pub fn pinned_columns(&self) -> Vec<&ColumnNode> {
        pinned_leaves(&self.tree)
            .into_iter()
            .filter_map(|idx| self.tree.node(idx))
            .collect()
    }

    pub fn last_pinned(&self) -> Option<&ColumnNode> {
        self.leaves().into_iter().find(|n| n.def.last_pinned)
    }

    pub fn column_width(&self, id: &ColumnId) -> Option<String> {
        self.column(id).map(|n| get_column_width(&n.def, &self.options))
    }

    pub fn feature_width_px(&self) -> f64 {
        feature_column_width_px(self.options.feature_count(), &self.options)
    }

    /// Feature column plus every visible leaf.
    pub fn content_width(&self) -> f64 {
        self.feature_width_px()
            + self
                .visible_leaves()
                .into_iter()
                .map(|n| column_width_px(&n.def, &self.options))
                .sum::<f64>()
    }

    pub fn header_rows(&self) -> Vec<Vec<HeaderCell>> {
        header_rows(&self.tree)
    }

    /// Toggle pinning of a leaf (or every leaf under a group).
    ///
    /// Returns false for an unknown id.
    pub fn toggle_pin(&mut self, id: &ColumnId) -> bool {
        let Some(idx) = self.tree.find(id) else {
            tracing::warn!("Cannot toggle pin of unknown column {}", id);
            return false;
        };
        let leaves = self.tree.leaves_under(idx);
        let pin = !leaves
            .iter()
            .all(|&leaf| self.tree.node(leaf).is_some_and(|n| n.def.pinned));
        for leaf in leaves {
            if let Some(node) = self.tree.node_mut(leaf) {
                node.def.pinned = pin;
            }
        }
        if let Some(node) = self.tree.node_mut(idx) {
            node.def.pinned = pin;
        }
        normalize_pinned(&mut self.tree);
        true
    }

    pub fn set_visible(&mut self, id: &ColumnId, visible: bool) -> bool {
        let Some(node) = self.tree.find(id).and_then(|idx| self.tree.node_mut(idx)) else {
            tracing::warn!("Cannot change visibility of unknown column {}", id);
            return false;
        };
        node.def.visible = visible;
        normalize_pinned(&mut self.tree);
        true
    }

    pub fn set_width(&mut self, id: &ColumnId, width: &str) -> bool {
        let Some(node) = self.tree.find(id).and_then(|idx| self.tree.node_mut(idx)) else {
            tracing::warn!("Cannot resize unknown column {}", id);
            return false;
        };
        node.def.width = Some(width.to_string());
        node.def.dynamic_width = None;
        true
    }

    pub fn set_dynamic_width(&mut self, id: &ColumnId, width: Option<String>) -> bool {
        let Some(node) = self.tree.find(id).and_then(|idx| self.tree.node_mut(idx)) else {
            return false;
        };
        node.def.dynamic_width = width;
        true
    }

    /// Move a column among its siblings. Pinned columns stay ahead of
    /// unpinned ones, so a move across that boundary is undone.
    pub fn move_column(&mut self, id: &ColumnId, to_index: usize) -> bool {
        let Some(idx) = self.tree.find(id) else {
            tracing::warn!("Cannot move unknown column {}", id);
            return false;
        };
        let moved = self.tree.move_within_siblings(idx, to_index);
        normalize_pinned(&mut self.tree);
        moved
    }

    /// Left offset of each visible pinned leaf inside the frozen band.
    pub fn pinned_sticky_offsets(&self) -> Vec<(ColumnId, f64)> {
        let mut left = self.feature_width_px();
        let mut out = Vec::new();
        for node in self.visible_leaves() {
            if !node.def.pinned {
                continue;
            }
            out.push((node.id.clone(), left));
            left += column_width_px(&node.def, &self.options);
        }
        out
    }

    /// Offsets that keep pinned elements fixed while their surface scrolls
    /// horizontally by `delta.left`.
    ///
    /// Covers header cells (including group headers), body, footer and,
    /// when present, filler rows and expanded nested content.
    pub fn update_pinned_column_pos(
        &self,
        delta: ScrollDelta,
        surfaces: PinnedSurfaces,
    ) -> PinnedLayout {
        let offsets = self.pinned_sticky_offsets();
        if offsets.is_empty() {
            return PinnedLayout {
                translate_x: delta.left,
                last_pinned: None,
                placements: Vec::new(),
            };
        }

        let mut row_surfaces = vec![PinnedSurface::Body, PinnedSurface::Footer];
        if surfaces.filler {
            row_surfaces.push(PinnedSurface::Filler);
        }
        if surfaces.nested {
            row_surfaces.push(PinnedSurface::NestedContent);
        }

        let mut placements = Vec::new();
        for (column, sticky_left) in &offsets {
            placements.push(PinnedPlacement {
                column: column.clone(),
                surface: PinnedSurface::Header,
                is_group_header: false,
                sticky_left: *sticky_left,
                translate_x: delta.left,
            });
        }

        // Group headers above pinned leaves start where their first pinned leaf does.
        for cell in self.header_rows().into_iter().flatten() {
            if cell.is_leaf || !cell.pinned {
                continue;
            }
            let Some(group) = self.tree.find(&cell.column) else {
                continue;
            };
            let first_left = self
                .tree
                .leaves_under(group)
                .into_iter()
                .filter_map(|leaf| self.tree.node(leaf))
                .find_map(|leaf| {
                    offsets
                        .iter()
                        .find(|(id, _)| *id == leaf.id)
                        .map(|(_, left)| *left)
                });
            if let Some(sticky_left) = first_left {
                placements.push(PinnedPlacement {
                    column: cell.column,
                    surface: PinnedSurface::Header,
                    is_group_header: true,
                    sticky_left,
                    translate_x: delta.left,
                });
            }
        }

        for surface in row_surfaces {
            for (column, sticky_left) in &offsets {
                placements.push(PinnedPlacement {
                    column: column.clone(),
                    surface,
                    is_group_header: false,
                    sticky_left: *sticky_left,
                    translate_x: delta.left,
                });
            }
        }

        PinnedLayout {
            translate_x: delta.left,
            last_pinned: self.last_pinned().map(|n| n.id.clone()),
            placements,
        }
    }
}
