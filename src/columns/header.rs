//! Header row construction for hierarchical columns.

use serde::Serialize;

use super::tree::{ColumnTree, NodeIdx};
use crate::types::ColumnId;

/// One header cell as consumed by the header host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    pub column: ColumnId,
    pub label: String,
    /// Visible leaves spanned (1 for a leaf)
    pub colspan: usize,
    pub rowspan: usize,
    pub is_leaf: bool,
    pub pinned: bool,
    pub last_pinned: bool,
}

/// Header levels from the outermost group row down to the leaf row.
///
/// Hidden leaves are skipped and groups left without visible leaves vanish.
/// Leaves above the bottom level span the remaining rows.
pub fn header_rows(tree: &ColumnTree) -> Vec<Vec<HeaderCell>> {
    let levels = tree
        .roots()
        .iter()
        .map(|&root| visible_depth(tree, root))
        .max()
        .unwrap_or(0);
    let mut rows: Vec<Vec<HeaderCell>> = vec![Vec::new(); levels];
    for &root in tree.roots() {
        push_cells(tree, root, 0, levels, &mut rows);
    }
    rows
}

/// Levels needed to render `idx`, 0 when nothing below it is visible.
fn visible_depth(tree: &ColumnTree, idx: NodeIdx) -> usize {
    let Some(node) = tree.node(idx) else {
        return 0;
    };
    if node.is_leaf() {
        return usize::from(node.def.visible);
    }
    let below = node
        .children
        .iter()
        .map(|&child| visible_depth(tree, child))
        .max()
        .unwrap_or(0);
    if below == 0 {
        0
    } else {
        below + 1
    }
}

fn visible_leaf_count(tree: &ColumnTree, idx: NodeIdx) -> usize {
    tree.leaves_under(idx)
        .into_iter()
        .filter(|&leaf| tree.node(leaf).is_some_and(|n| n.def.visible))
        .count()
}

fn push_cells(
    tree: &ColumnTree,
    idx: NodeIdx,
    level: usize,
    levels: usize,
    rows: &mut [Vec<HeaderCell>],
) {
    let Some(node) = tree.node(idx) else {
        return;
    };
    let colspan = visible_leaf_count(tree, idx);
    if colspan == 0 {
        return;
    }
    let rowspan = if node.is_leaf() {
        levels.saturating_sub(level).max(1)
    } else {
        1
    };
    let pinned = node.def.pinned || tree.leaves_under(idx).into_iter().any(|leaf| {
        tree.node(leaf).is_some_and(|n| n.def.pinned && n.def.visible)
    });
    if let Some(row) = rows.get_mut(level) {
        row.push(HeaderCell {
            column: node.id.clone(),
            label: node.def.label.clone(),
            colspan,
            rowspan,
            is_leaf: node.is_leaf(),
            pinned,
            last_pinned: node.def.last_pinned,
        });
    }
    for &child in &node.children {
        push_cells(tree, child, level + 1, levels, rows);
    }
}
