//! Pinned-column ordering and repositioning.

use serde::Serialize;

use super::tree::{ColumnTree, NodeIdx};
use crate::types::ColumnId;

/// Where a pinned element lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PinnedSurface {
    Header,
    Body,
    Footer,
    Filler,
    NestedContent,
}

/// Which optional surfaces currently exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinnedSurfaces {
    pub filler: bool,
    pub nested: bool,
}

/// Position instructions for one pinned element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedPlacement {
    pub column: ColumnId,
    pub surface: PinnedSurface,
    pub is_group_header: bool,
    /// Left edge of the element within the frozen band
    pub sticky_left: f64,
    /// Horizontal offset that cancels the scroll of its surface
    pub translate_x: f64,
}

/// Result of one pinned-column repositioning pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedLayout {
    pub translate_x: f64,
    pub last_pinned: Option<ColumnId>,
    pub placements: Vec<PinnedPlacement>,
}

/// True when `idx` or any leaf below it is pinned.
pub(crate) fn contains_pinned(tree: &ColumnTree, idx: NodeIdx) -> bool {
    tree.leaves_under(idx)
        .into_iter()
        .any(|leaf| tree.node(leaf).is_some_and(|n| n.def.pinned))
}

/// Reorder so pinned columns precede unpinned ones at every level, keeping
/// relative order otherwise, and mark the final pinned leaf.
///
/// Returns true when the order changed.
pub fn normalize_pinned(tree: &mut ColumnTree) -> bool {
    let mut changed = reorder_level(tree, None);
    for group in tree.groups() {
        changed |= reorder_level(tree, Some(group));
    }
    mark_last_pinned(tree);
    changed
}

fn reorder_level(tree: &mut ColumnTree, parent: Option<NodeIdx>) -> bool {
    let current: Vec<NodeIdx> = match parent {
        Some(p) => tree.node(p).map(|n| n.children.clone()).unwrap_or_default(),
        None => tree.roots().to_vec(),
    };
    let (pinned, unpinned): (Vec<NodeIdx>, Vec<NodeIdx>) = current
        .iter()
        .partition(|&&idx| contains_pinned(tree, idx));
    let reordered: Vec<NodeIdx> = pinned.into_iter().chain(unpinned).collect();
    if reordered == current {
        return false;
    }
    if let Some(list) = tree.children_mut(parent) {
        *list = reordered;
    }
    true
}

/// Exactly one leaf, the final pinned leaf of the flattened order, carries
/// `last_pinned`. Visibility does not move the mark.
fn mark_last_pinned(tree: &mut ColumnTree) {
    let last = pinned_leaves(tree).last().copied();
    for idx in tree.leaves() {
        if let Some(node) = tree.node_mut(idx) {
            node.def.last_pinned = Some(idx) == last;
        }
    }
}

/// Pinned leaves in display order.
pub fn pinned_leaves(tree: &ColumnTree) -> Vec<NodeIdx> {
    tree.leaves()
        .into_iter()
        .filter(|&idx| tree.node(idx).is_some_and(|n| n.def.pinned))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ColumnDef;

    fn ids(tree: &ColumnTree) -> Vec<String> {
        tree.leaves()
            .into_iter()
            .map(|idx| tree.node(idx).unwrap().id.0.clone())
            .collect()
    }

    fn last_pinned(tree: &ColumnTree) -> Vec<String> {
        tree.leaves()
            .into_iter()
            .filter_map(|idx| {
                let n = tree.node(idx).unwrap();
                n.def.last_pinned.then(|| n.id.0.clone())
            })
            .collect()
    }

    #[test]
    fn test_pin_reorder_flat() {
        let mut tree = ColumnTree::from_defs(&[
            ColumnDef::leaf("A"),
            ColumnDef::leaf("B").pinned(),
            ColumnDef::leaf("C"),
            ColumnDef::leaf("D").pinned(),
        ]);
        assert!(normalize_pinned(&mut tree));
        assert_eq!(ids(&tree), vec!["B", "D", "A", "C"]);
        assert_eq!(last_pinned(&tree), vec!["D"]);
    }

    #[test]
    fn test_pin_reorder_is_idempotent() {
        let mut tree = ColumnTree::from_defs(&[ColumnDef::leaf("A").pinned(), ColumnDef::leaf("B")]);
        assert!(!normalize_pinned(&mut tree));
        assert_eq!(last_pinned(&tree), vec!["A"]);
    }

    #[test]
    fn test_pin_reorder_inside_group() {
        let mut tree = ColumnTree::from_defs(&[
            ColumnDef::leaf("A"),
            ColumnDef::group(
                "G",
                "Group",
                vec![ColumnDef::leaf("X"), ColumnDef::leaf("Y").pinned()],
            ),
        ]);
        normalize_pinned(&mut tree);
        assert_eq!(ids(&tree), vec!["Y", "X", "A"]);
        assert_eq!(last_pinned(&tree), vec!["Y"]);
    }

    #[test]
    fn test_last_pinned_is_final_pinned_leaf_even_when_hidden() {
        let mut tree = ColumnTree::from_defs(&[
            ColumnDef::leaf("A").pinned(),
            ColumnDef::leaf("B").pinned().hidden(),
            ColumnDef::leaf("C"),
        ]);
        normalize_pinned(&mut tree);
        assert_eq!(last_pinned(&tree), vec!["B"]);
    }

    #[test]
    fn test_no_pinned_columns() {
        let mut tree = ColumnTree::from_defs(&[ColumnDef::leaf("A"), ColumnDef::leaf("B")]);
        normalize_pinned(&mut tree);
        assert!(last_pinned(&tree).is_empty());
        assert!(pinned_leaves(&tree).is_empty());
    }
}
