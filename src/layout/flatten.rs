//! Flattening of the (possibly grouped) page into renderable entries.

use std::collections::HashSet;

use serde::Serialize;

use super::row_heights::HeightKey;
use crate::types::{GroupNode, GroupPath, GroupRows, RowId, RowWrapper};

/// One renderable line of the flattened sequence
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FlatEntry {
    /// Group header line
    #[serde(rename_all = "camelCase")]
    Group {
        key: String,
        field: String,
        path: GroupPath,
        depth: usize,
        row_count: usize,
        expanded: bool,
    },
    Row { row: RowWrapper, depth: usize },
    /// Expanded nested content below a row
    Nested { parent: RowId, depth: usize },
}

impl FlatEntry {
    /// Cache key for this entry; groups and nested content use their own
    /// namespaces so they never collide with row identities.
    pub fn height_key(&self) -> HeightKey {
        match self {
            Self::Group { path, .. } => HeightKey::Group(path.joined()),
            Self::Row { row, .. } => HeightKey::Row(row.id),
            Self::Nested { parent, .. } => HeightKey::Nested(*parent),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Group { depth, .. } | Self::Row { depth, .. } | Self::Nested { depth, .. } => *depth,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    pub fn row(&self) -> Option<&RowWrapper> {
        match self {
            Self::Row { row, .. } => Some(row),
            _ => None,
        }
    }
}

/// Inputs to one flatten pass
#[derive(Debug, Clone, Copy)]
pub struct FlattenSource<'a> {
    pub rows: &'a [RowWrapper],
    /// Group tree to walk instead of `rows` when grouping is active
    pub groups: Option<&'a [GroupNode]>,
    pub collapsed: &'a HashSet<GroupPath>,
    /// Emit nested-content entries below expanded rows
    pub nested_rows: bool,
}

/// Walk the page into a single ordered list. Collapsed groups contribute
/// only their header line.
pub fn flatten(source: FlattenSource<'_>) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    match source.groups {
        Some(groups) => push_groups(groups, 0, &source, &mut out),
        None => push_rows(source.rows, 0, &source, &mut out),
    }
    out
}

fn push_rows(rows: &[RowWrapper], depth: usize, source: &FlattenSource<'_>, out: &mut Vec<FlatEntry>) {
    for row in rows {
        out.push(FlatEntry::Row {
            row: row.clone(),
            depth,
        });
        if source.nested_rows && row.nested_expanded {
            out.push(FlatEntry::Nested {
                parent: row.id,
                depth,
            });
        }
    }
}

fn push_groups(groups: &[GroupNode], depth: usize, source: &FlattenSource<'_>, out: &mut Vec<FlatEntry>) {
    for group in groups {
        let expanded = !source.collapsed.contains(&group.path);
        out.push(FlatEntry::Group {
            key: group.key.clone(),
            field: group.field.clone(),
            path: group.path.clone(),
            depth,
            row_count: group.row_count(),
            expanded,
        });
        if !expanded {
            continue;
        }
        match &group.rows {
            GroupRows::Rows(rows) => push_rows(rows, depth + 1, source, out),
            GroupRows::Groups(children) => push_groups(children, depth + 1, source, out),
        }
    }
}
