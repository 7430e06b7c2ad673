use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{value_text, RowWrapper};

/// Separator used when a group path is collapsed into a single key.
const PATH_SEPARATOR: char = '\u{1f}';

/// Prefix of path segments for values that are not strings.
const TYPED_SEGMENT: char = '\u{1e}';

/// Path segment identifying the bucket of `value`.
///
/// Strings are their own segment; every other kind is tagged, so `null`, a
/// missing field and `""` land in different groups, as do `1` and `"1"`.
pub fn group_segment(value: Option<&Value>) -> String {
    let kind = match value {
        Some(Value::String(s)) => return s.clone(),
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    };
    format!("{TYPED_SEGMENT}{kind}:{}", value_text(value))
}

/// Keys from the outermost group down to one group node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupPath(pub Vec<String>);

impl GroupPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, key: &str) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.to_string());
        Self(keys)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Single-string form, unique per path.
    pub fn joined(&self) -> String {
        let mut out = String::new();
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(PATH_SEPARATOR);
            }
            out.push_str(key);
        }
        out
    }
}

impl From<Vec<&str>> for GroupPath {
    fn from(keys: Vec<&str>) -> Self {
        Self(keys.into_iter().map(str::to_string).collect())
    }
}

/// Members of a group: rows for the innermost level, nested groups otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupRows {
    Rows(Vec<RowWrapper>),
    Groups(Vec<GroupNode>),
}

/// One bucket of the group tree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub key: String,
    /// Field this level was bucketed by
    pub field: String,
    pub path: GroupPath,
    pub rows: GroupRows,
}

impl GroupNode {
    /// Number of data rows under this node at any depth.
    pub fn row_count(&self) -> usize {
        match &self.rows {
            GroupRows::Rows(rows) => rows.len(),
            GroupRows::Groups(groups) => groups.iter().map(GroupNode::row_count).sum(),
        }
    }

    /// Data rows under this node in depth-first order.
    pub fn leaf_rows(&self) -> Vec<&RowWrapper> {
        let mut out = Vec::new();
        self.collect_rows(&mut out);
        out
    }

    fn collect_rows<'a>(&'a self, out: &mut Vec<&'a RowWrapper>) {
        match &self.rows {
            GroupRows::Rows(rows) => out.extend(rows.iter()),
            GroupRows::Groups(groups) => {
                for group in groups {
                    group.collect_rows(out);
                }
            }
        }
    }

    /// Nesting depth below and including this node.
    pub fn depth(&self) -> usize {
        match &self.rows {
            GroupRows::Rows(_) => 1,
            GroupRows::Groups(groups) => 1 + groups.iter().map(GroupNode::depth).max().unwrap_or(0),
        }
    }
}

/// Find a node by path in a group forest.
pub fn find_group<'a>(groups: &'a [GroupNode], path: &GroupPath) -> Option<&'a GroupNode> {
    let mut level = groups;
    let mut found = None;
    for key in &path.0 {
        let node = level.iter().find(|g| g.path.0.last() == Some(key))?;
        found = Some(node);
        level = match &node.rows {
            GroupRows::Groups(children) => children,
            GroupRows::Rows(_) => &[],
        };
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_path_joined_is_unique() {
        let a = GroupPath::from(vec!["a/b", "c"]);
        let b = GroupPath::from(vec!["a", "b/c"]);
        assert_ne!(a.joined(), b.joined());
        assert_eq!(GroupPath::root().joined(), "");
        assert_eq!(a.child("d").depth(), 3);
    }

    #[test]
    fn test_group_segment_keeps_kinds_apart() {
        use serde_json::json;
        let segments = [
            group_segment(None),
            group_segment(Some(&Value::Null)),
            group_segment(Some(&json!(""))),
            group_segment(Some(&json!(1))),
            group_segment(Some(&json!("1"))),
            group_segment(Some(&json!(true))),
            group_segment(Some(&json!("true"))),
        ];
        for (i, a) in segments.iter().enumerate() {
            for b in segments.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(group_segment(Some(&json!("red"))), "red");
    }
}
