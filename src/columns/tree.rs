//! Arena-indexed column tree.
//!
//! Nodes live in one `Vec` and refer to each other by index; parent links are
//! kept in a separate map so nodes never hold back-references.

use std::collections::HashMap;

use crate::types::{ColumnDef, ColumnId};

/// Index of a node inside a [`ColumnTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// One column or group header
#[derive(Debug, Clone)]
pub struct ColumnNode {
    pub id: ColumnId,
    /// Definition without its `children` (see [`ColumnNode::children`])
    pub def: ColumnDef,
    pub children: Vec<NodeIdx>,
}

impl ColumnNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn field(&self) -> Option<&str> {
        self.def.field.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnTree {
    nodes: Vec<ColumnNode>,
    roots: Vec<NodeIdx>,
    parents: HashMap<NodeIdx, NodeIdx>,
    by_id: HashMap<ColumnId, NodeIdx>,
}

impl ColumnTree {
    /// Build the arena from caller definitions.
    ///
    /// Missing ids are derived from field/label, duplicates get a numeric
    /// suffix, and fields on group headers are dropped.
    pub fn from_defs(defs: &[ColumnDef]) -> Self {
        let mut tree = Self::default();
        for def in defs {
            let idx = tree.insert(def, None);
            tree.roots.push(idx);
        }
        tree
    }

    fn insert(&mut self, def: &ColumnDef, parent: Option<NodeIdx>) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len());
        let id = self.unique_id(def.resolved_id());

        let mut stored = def.clone();
        stored.children = Vec::new();
        stored.id = id.0.clone();
        if !def.is_leaf() && stored.field.is_some() {
            tracing::warn!("Column group {} has a field; group headers cannot be bound to data", id);
            stored.field = None;
        }

        self.nodes.push(ColumnNode {
            id: id.clone(),
            def: stored,
            children: Vec::new(),
        });
        self.by_id.insert(id, idx);
        if let Some(parent) = parent {
            self.parents.insert(idx, parent);
        }

        let children: Vec<NodeIdx> = def
            .children
            .iter()
            .map(|child| self.insert(child, Some(idx)))
            .collect();
        if let Some(node) = self.nodes.get_mut(idx.0) {
            node.children = children;
        }
        idx
    }

    fn unique_id(&self, base: String) -> ColumnId {
        let base = if base.is_empty() {
            format!("col{}", self.nodes.len())
        } else {
            base
        };
        let candidate = ColumnId(base.clone());
        if !self.by_id.contains_key(&candidate) {
            return candidate;
        }
        tracing::warn!("Duplicate column id {}; assigning a suffixed id", base);
        let mut n = 2;
        loop {
            let candidate = ColumnId(format!("{base}_{n}"));
            if !self.by_id.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Rebuild nested definitions in current order.
    pub fn to_defs(&self) -> Vec<ColumnDef> {
        self.roots.iter().filter_map(|&idx| self.to_def(idx)).collect()
    }

    fn to_def(&self, idx: NodeIdx) -> Option<ColumnDef> {
        let node = self.node(idx)?;
        let mut def = node.def.clone();
        def.children = node
            .children
            .iter()
            .filter_map(|&child| self.to_def(child))
            .collect();
        Some(def)
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&ColumnNode> {
        self.nodes.get(idx.0)
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut ColumnNode> {
        self.nodes.get_mut(idx.0)
    }

    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, id: &ColumnId) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    /// First leaf bound to `field`.
    pub fn find_by_field(&self, field: &str) -> Option<NodeIdx> {
        self.leaves()
            .into_iter()
            .find(|&idx| self.node(idx).and_then(ColumnNode::field) == Some(field))
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.parents.get(&idx).copied()
    }

    /// Depth of a node (roots are 0).
    pub fn depth(&self, idx: NodeIdx) -> usize {
        let mut depth = 0;
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Leaves in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    /// Leaves under `idx` (the node itself when it is a leaf).
    pub fn leaves_under(&self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        self.collect_leaves(idx, &mut out);
        out
    }

    fn collect_leaves(&self, idx: NodeIdx, out: &mut Vec<NodeIdx>) {
        let Some(node) = self.node(idx) else {
            return;
        };
        if node.is_leaf() {
            out.push(idx);
            return;
        }
        for &child in &node.children {
            self.collect_leaves(child, out);
        }
    }

    /// Sibling list containing `idx` (the root list for top-level nodes).
    pub(crate) fn siblings_mut(&mut self, idx: NodeIdx) -> Option<&mut Vec<NodeIdx>> {
        match self.parent(idx) {
            Some(parent) => self.nodes.get_mut(parent.0).map(|p| &mut p.children),
            None => Some(&mut self.roots),
        }
    }

    /// Mutable access to a child list (`None` addresses the root list).
    pub(crate) fn children_mut(&mut self, parent: Option<NodeIdx>) -> Option<&mut Vec<NodeIdx>> {
        match parent {
            Some(parent) => self.nodes.get_mut(parent.0).map(|p| &mut p.children),
            None => Some(&mut self.roots),
        }
    }

    /// Every non-leaf node, parents before children.
    pub(crate) fn groups(&self) -> Vec<NodeIdx> {
        (0..self.nodes.len())
            .map(NodeIdx)
            .filter(|&idx| self.node(idx).is_some_and(|n| !n.is_leaf()))
            .collect()
    }

    /// Move `idx` to position `to_index` among its siblings.
    pub fn move_within_siblings(&mut self, idx: NodeIdx, to_index: usize) -> bool {
        let Some(siblings) = self.siblings_mut(idx) else {
            return false;
        };
        let Some(from) = siblings.iter().position(|&s| s == idx) else {
            return false;
        };
        siblings.remove(from);
        let to = to_index.min(siblings.len());
        siblings.insert(to, idx);
        from != to
    }
}
