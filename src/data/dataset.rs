//! Immutable result of one run of the data pipeline.

use std::sync::Arc;

use serde::Serialize;

use super::page::Pagination;
use crate::types::{ColumnId, GroupNode, RowWrapper};

/// Everything the render side needs from one pipeline run.
///
/// `total_row_count` is the post-filter, pre-page count. `page_data` is a
/// contiguous run of the post-filter sequence (in group order when grouping
/// is active) no longer than the page size.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDataset {
    #[serde(skip)]
    pub original: Vec<RowWrapper>,
    #[serde(skip)]
    pub sorted: Vec<RowWrapper>,
    #[serde(skip)]
    pub filtered: Vec<RowWrapper>,
    /// Group tree over the whole post-filter sequence
    #[serde(skip)]
    pub groups: Vec<GroupNode>,
    pub page_data: Vec<RowWrapper>,
    /// Group tree over `page_data`, empty when ungrouped
    pub page_groups: Vec<GroupNode>,
    pub header_row: Option<RowWrapper>,
    pub footer_row: Option<RowWrapper>,
    pub filler_rows: Vec<RowWrapper>,
    pub pinned_columns: Vec<ColumnId>,
    pub group_by: Vec<String>,
    pub pagination: Pagination,
    pub total_row_count: usize,
    #[serde(skip)]
    pub columns: Arc<[ColumnId]>,
}

impl GridDataset {
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.page_data.is_empty()
    }
}
