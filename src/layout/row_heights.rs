//! Measured row heights with an implicit default.

use std::collections::{HashMap, HashSet};

use crate::types::{RowId, DEFAULT_ROW_HEIGHT};

/// Identity under which a height is cached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeightKey {
    Row(RowId),
    /// Joined group path
    Group(String),
    /// Nested content below a row
    Nested(RowId),
}

/// Pixel heights by entry identity. Unmeasured entries use `default_height`.
#[derive(Debug, Clone)]
pub struct RowHeightCache {
    default_height: f64,
    heights: HashMap<HeightKey, f64>,
}

impl Default for RowHeightCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT)
    }
}

impl RowHeightCache {
    pub fn new(default_height: f64) -> Self {
        Self {
            default_height,
            heights: HashMap::new(),
        }
    }

    pub fn default_height(&self) -> f64 {
        self.default_height
    }

    pub fn set_default_height(&mut self, height: f64) {
        self.default_height = height;
    }

    pub fn get(&self, key: &HeightKey) -> f64 {
        self.heights.get(key).copied().unwrap_or(self.default_height)
    }

    pub fn is_measured(&self, key: &HeightKey) -> bool {
        self.heights.contains_key(key)
    }

    /// Record a height; returns true when it differs from what was cached.
    pub fn set(&mut self, key: HeightKey, height: f64) -> bool {
        let previous = self.get(&key);
        let was_measured = self.heights.contains_key(&key);
        self.heights.insert(key, height);
        !was_measured || (previous - height).abs() > f64::EPSILON
    }

    pub fn remove(&mut self, key: &HeightKey) -> bool {
        self.heights.remove(key).is_some()
    }

    /// Drop entries whose owner left the flattened sequence.
    pub fn retain_keys(&mut self, live: &HashSet<HeightKey>) {
        self.heights.retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }
}
