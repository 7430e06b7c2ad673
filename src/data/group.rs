//! Stable multi-key grouping.

use std::collections::HashMap;

use crate::types::{group_segment, value_text, GroupNode, GroupPath, GroupRows, RowWrapper};

/// Bucket `rows` by `fields[0]`, then each bucket by the next field.
///
/// Buckets appear in order of first occurrence and rows keep their relative
/// order inside a bucket. Values of different kinds never share a bucket.
/// An empty field list yields no groups.
pub fn group_rows(rows: &[RowWrapper], fields: &[String]) -> Vec<GroupNode> {
    build_level(rows, fields, &GroupPath::root())
}

fn build_level(rows: &[RowWrapper], fields: &[String], parent: &GroupPath) -> Vec<GroupNode> {
    let Some((field, rest)) = fields.split_first() else {
        return Vec::new();
    };

    let mut order: Vec<(String, String, Vec<RowWrapper>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let value = row.value(field);
        let segment = group_segment(value);
        match index.get(&segment) {
            Some(&slot) => {
                if let Some((_, _, bucket)) = order.get_mut(slot) {
                    bucket.push(row.clone());
                }
            }
            None => {
                index.insert(segment.clone(), order.len());
                order.push((segment, value_text(value), vec![row.clone()]));
            }
        }
    }

    order
        .into_iter()
        .map(|(segment, key, bucket)| {
            let path = parent.child(&segment);
            let rows = if rest.is_empty() {
                GroupRows::Rows(bucket)
            } else {
                GroupRows::Groups(build_level(&bucket, rest, &path))
            };
            GroupNode {
                key,
                field: field.clone(),
                path,
                rows,
            }
        })
        .collect()
}

/// Data rows of a group forest in depth-first order.
pub fn ordered_rows(groups: &[GroupNode]) -> Vec<RowWrapper> {
    groups
        .iter()
        .flat_map(|group| group.leaf_rows().into_iter().cloned())
        .collect()
}
