//! Save and restore of user-adjustable grid state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnLayout;
use crate::data::GridDataEngine;
use crate::types::{ColumnDef, SortState};

/// Persistable grid state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState {
    #[serde(default)]
    pub column_defs: Vec<ColumnDef>,
    #[serde(default)]
    pub sort_state: SortState,
    #[serde(default)]
    pub group_by: Vec<String>,
}

impl GridState {
    pub fn capture(columns: &ColumnLayout, data: &GridDataEngine) -> Self {
        Self {
            column_defs: columns.column_defs(),
            sort_state: data.sort_state().to_vec(),
            group_by: data.group_by().to_vec(),
        }
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn saved_leaves(defs: &[ColumnDef], out: &mut Vec<ColumnDef>) {
    for def in defs {
        if def.is_leaf() {
            out.push(def.clone());
        } else {
            saved_leaves(&def.children, out);
        }
    }
}

fn first_field(def: &ColumnDef) -> Option<&str> {
    if def.is_leaf() {
        return def.field.as_deref();
    }
    def.children.iter().find_map(first_field)
}

/// Merge saved column settings onto the current definitions.
///
/// Leaves are matched on `field`. The current ids, labels and grouping are
/// kept; width, visibility, pinning and sibling order come from the saved
/// state. Saved columns without a current counterpart are dropped.
pub fn restore_column_defs(current: &[ColumnDef], saved: &[ColumnDef]) -> Vec<ColumnDef> {
    let mut leaves = Vec::new();
    saved_leaves(saved, &mut leaves);
    let rank: HashMap<String, usize> = leaves
        .iter()
        .enumerate()
        .filter_map(|(i, def)| def.field.clone().map(|f| (f, i)))
        .collect();
    let by_field: HashMap<String, &ColumnDef> = leaves
        .iter()
        .filter_map(|def| def.field.clone().map(|f| (f, def)))
        .collect();
    merge_level(current, &rank, &by_field)
}

fn merge_level(
    current: &[ColumnDef],
    rank: &HashMap<String, usize>,
    by_field: &HashMap<String, &ColumnDef>,
) -> Vec<ColumnDef> {
    let mut merged: Vec<ColumnDef> = current
        .iter()
        .map(|def| {
            let mut out = def.clone();
            if def.is_leaf() {
                if let Some(saved) = def.field.as_ref().and_then(|f| by_field.get(f)) {
                    out.width.clone_from(&saved.width);
                    out.dynamic_width.clone_from(&saved.dynamic_width);
                    out.visible = saved.visible;
                    out.pinned = saved.pinned;
                }
            } else {
                out.children = merge_level(&def.children, rank, by_field);
            }
            out
        })
        .collect();
    // Unmatched columns keep their relative order after the matched ones.
    merged.sort_by_key(|def| first_field(def).and_then(|f| rank.get(f)).copied().unwrap_or(usize::MAX));
    merged
}
