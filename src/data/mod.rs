//! GridDataEngine: sort → filter → group → page over the authoritative rows.

mod dataset;
mod filter;
mod group;
mod page;
mod remote;
mod sort;

pub use dataset::GridDataset;
pub use filter::{filter_rows, is_active, matches_condition, row_matches, FilterFn};
pub use group::{group_rows, ordered_rows};
pub use page::{clamp_page, page_bounds, total_pages, Pagination};
pub use remote::{DataRequest, DataResponse, PendingRequest, RemoteDataSource};
pub use sort::{compare_rows, compare_values, sort_rows, Comparator};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::columns::ColumnLayout;
use crate::error::Result;
use crate::types::{
    value_text, ColumnId, FilterState, GridOptions, GroupNode, GroupPath, GroupRows, Record,
    RowId, RowKind, RowUiState, RowWrapper, SortEntry, SortState,
};

/// Page size used for remote requests when none is configured
pub const FALLBACK_REMOTE_PAGE_SIZE: usize = 100;

const HEADER_ROW_ID: RowId = RowId(u64::MAX);
const FOOTER_ROW_ID: RowId = RowId(u64::MAX - 1);
const FILLER_ROW_ID_BASE: u64 = u64::MAX - 2;

/// What a state change means for the rest of the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataChange {
    /// The derived sequence changed
    pub recomputed: bool,
    /// Scroll position must return to (0, 0)
    pub scroll_reset: bool,
    /// A remote request must be issued before the display can change
    pub needs_fetch: bool,
}

impl DataChange {
    pub const NONE: DataChange = DataChange {
        recomputed: false,
        scroll_reset: false,
        needs_fetch: false,
    };

    /// Combined effect of two consecutive changes.
    pub fn merge(self, other: DataChange) -> DataChange {
        DataChange {
            recomputed: self.recomputed || other.recomputed,
            scroll_reset: self.scroll_reset || other.scroll_reset,
            needs_fetch: self.needs_fetch || other.needs_fetch,
        }
    }
}

/// Owns the authoritative rows and derives the sequence handed to rendering.
pub struct GridDataEngine {
    records: Vec<Arc<Record>>,
    ids: Vec<RowId>,
    next_row_id: u64,
    key_ids: HashMap<String, RowId>,
    columns: Arc<[ColumnId]>,
    pinned_columns: Vec<ColumnId>,
    /// Leaf fields; `None` until columns are known, accepting every field
    known_fields: Option<HashSet<String>>,
    page_size: Option<usize>,
    filler_rows: bool,
    row_key: Option<String>,
    sort_state: SortState,
    filter_state: FilterState,
    group_by: Vec<String>,
    current_page: usize,
    server_total: Option<usize>,
    ui_state: HashMap<RowId, RowUiState>,
    collapsed: HashSet<GroupPath>,
    comparator: Option<Box<Comparator>>,
    custom_filter: Option<Box<FilterFn>>,
    remote: bool,
    group_keys: Vec<String>,
    generation: u64,
    dataset: GridDataset,
}

impl std::fmt::Debug for GridDataEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDataEngine")
            .field("rows", &self.records.len())
            .field("sort_state", &self.sort_state)
            .field("filter_state", &self.filter_state)
            .field("group_by", &self.group_by)
            .field("current_page", &self.current_page)
            .field("remote", &self.remote)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for GridDataEngine {
    fn default() -> Self {
        Self::new(&GridOptions::default())
    }
}

impl GridDataEngine {
    pub fn new(options: &GridOptions) -> Self {
        let mut engine = Self {
            records: Vec::new(),
            ids: Vec::new(),
            next_row_id: 0,
            key_ids: HashMap::new(),
            columns: Arc::from(Vec::new()),
            pinned_columns: Vec::new(),
            known_fields: None,
            page_size: options.page_size,
            filler_rows: options.filler_rows,
            row_key: options.row_key.clone(),
            sort_state: Vec::new(),
            filter_state: FilterState::new(),
            group_by: Vec::new(),
            current_page: 1,
            server_total: None,
            ui_state: HashMap::new(),
            collapsed: HashSet::new(),
            comparator: None,
            custom_filter: None,
            remote: false,
            group_keys: Vec::new(),
            generation: 0,
            dataset: GridDataset::default(),
        };
        engine.recompute();
        engine
    }

    /// Pick up paging and identity settings from new options.
    pub fn configure(&mut self, options: &GridOptions) -> DataChange {
        self.page_size = options.page_size;
        self.filler_rows = options.filler_rows;
        self.row_key = options.row_key.clone();
        self.refresh(true)
    }

    /// Adopt the leaf columns of `layout`; group-by entries for fields that no
    /// longer exist are dropped.
    pub fn sync_columns(&mut self, layout: &ColumnLayout) -> DataChange {
        self.columns = Arc::from(layout.leaf_ids());
        self.pinned_columns = layout.pinned_columns().iter().map(|c| c.id.clone()).collect();
        let fields: HashSet<String> = layout.leaf_fields().into_iter().collect();
        self.known_fields = if fields.is_empty() { None } else { Some(fields) };

        let before = self.group_by.len();
        let known = self.known_fields.clone();
        self.group_by.retain(|field| {
            let keep = known.as_ref().map_or(true, |k| k.contains(field));
            if !keep {
                tracing::warn!("Dropping group-by on removed column {:?}", field);
            }
            keep
        });
        if self.group_by.len() != before {
            self.collapsed.clear();
        }
        self.recompute();
        DataChange {
            recomputed: true,
            ..DataChange::NONE
        }
    }

    fn is_known(&self, field: &str) -> bool {
        self.known_fields.as_ref().map_or(true, |k| k.contains(field))
    }

    // ---- data ------------------------------------------------------------

    /// Replace the rows. With `total_count` the rows are taken as the current
    /// server page and client paging is skipped.
    pub fn set_data(&mut self, rows: Vec<Record>, total_count: Option<usize>) -> DataChange {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut ids = Vec::with_capacity(rows.len());
        for record in &rows {
            let mut id = self.identity_for(record);
            if !seen.insert(id) {
                tracing::warn!("Duplicate row key {}; row gets its own identity", id);
                id = self.allocate_id();
                seen.insert(id);
            }
            ids.push(id);
        }
        self.ids = ids;
        self.records = rows.into_iter().map(Arc::new).collect();
        self.server_total = total_count;

        // Identities and UI state of rows that left the data are forgotten.
        let live: HashSet<RowId> = self.ids.iter().copied().collect();
        self.key_ids.retain(|_, id| live.contains(id));
        self.ui_state.retain(|id, _| live.contains(id));
        if self.records.is_empty() {
            self.current_page = 1;
        }
        self.recompute();
        DataChange {
            recomputed: true,
            ..DataChange::NONE
        }
    }

    fn identity_for(&mut self, record: &Record) -> RowId {
        if let Some(field) = self.row_key.clone() {
            let key = value_text(crate::types::field_value(record, &field));
            if !key.is_empty() {
                if let Some(&id) = self.key_ids.get(&key) {
                    return id;
                }
                let id = self.allocate_id();
                self.key_ids.insert(key, id);
                return id;
            }
        }
        self.allocate_id()
    }

    fn allocate_id(&mut self) -> RowId {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        id
    }

    pub fn set_comparator(&mut self, comparator: Option<Box<Comparator>>) -> DataChange {
        self.comparator = comparator;
        self.refresh(false)
    }

    pub fn set_custom_filter(&mut self, predicate: Option<Box<FilterFn>>) -> DataChange {
        self.custom_filter = predicate;
        self.refresh(false)
    }

    // ---- sort / filter / group / page ------------------------------------

    /// Replace the sort state. Resets to page 1 and asks for scroll reset.
    pub fn apply_sorting(&mut self, sort_state: SortState) -> DataChange {
        for entry in &sort_state {
            if !self.is_known(&entry.field) {
                tracing::warn!("Ignoring sort on unknown field {:?}", entry.field);
            }
        }
        self.sort_state = sort_state;
        self.current_page = 1;
        self.refresh(true)
    }

    /// Replace the filter state. Resets to page 1.
    pub fn apply_filter(&mut self, filter_state: FilterState) -> DataChange {
        for field in filter_state.keys() {
            if !self.is_known(field) {
                tracing::warn!("Ignoring filter on unknown field {:?}", field);
            }
        }
        self.filter_state = filter_state;
        self.current_page = 1;
        self.refresh(true)
    }

    /// Append `field` to the group-by list. Unknown or duplicate fields are
    /// ignored.
    pub fn add_group_by_column(&mut self, field: &str) -> DataChange {
        if !self.is_known(field) {
            tracing::warn!("Cannot group by unknown field {:?}", field);
            return DataChange::NONE;
        }
        if self.group_by.iter().any(|f| f == field) {
            return DataChange::NONE;
        }
        self.group_by.push(field.to_string());
        self.collapsed.clear();
        self.current_page = 1;
        self.refresh(true)
    }

    pub fn remove_group_by_column(&mut self, field: &str) -> DataChange {
        let before = self.group_by.len();
        self.group_by.retain(|f| f != field);
        if self.group_by.len() == before {
            return DataChange::NONE;
        }
        self.collapsed.clear();
        self.current_page = 1;
        self.refresh(true)
    }

    /// Replace the whole group-by list, dropping unknown fields.
    pub fn set_group_by(&mut self, fields: Vec<String>) -> DataChange {
        let mut valid: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !self.is_known(&field) {
                tracing::warn!("Dropping group-by on unknown field {:?}", field);
            } else if !valid.contains(&field) {
                valid.push(field);
            }
        }
        if valid == self.group_by {
            return DataChange::NONE;
        }
        self.group_by = valid;
        self.collapsed.clear();
        self.current_page = 1;
        self.refresh(true)
    }

    /// Move to `page` (1-based, clamped into range).
    pub fn select_page(&mut self, page: usize) -> DataChange {
        let total = self.server_total.unwrap_or(self.dataset.total_row_count);
        let page_size = if self.remote {
            Some(self.remote_page_size())
        } else {
            self.page_size
        };
        let page = clamp_page(page, page_size, total);
        if page == self.current_page && !self.remote {
            return DataChange::NONE;
        }
        self.current_page = page;
        self.refresh(true)
    }

    fn refresh(&mut self, scroll_reset: bool) -> DataChange {
        if self.remote {
            return DataChange {
                recomputed: false,
                scroll_reset,
                needs_fetch: true,
            };
        }
        self.recompute();
        DataChange {
            recomputed: true,
            scroll_reset,
            needs_fetch: false,
        }
    }

    // ---- remote ----------------------------------------------------------

    /// Route sort/filter/group/page through a remote source.
    pub fn set_remote(&mut self, enabled: bool) {
        if enabled && self.page_size.is_none() {
            tracing::warn!(
                "Remote data without pageSize; requesting {} rows per page",
                FALLBACK_REMOTE_PAGE_SIZE
            );
        }
        self.remote = enabled;
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Keys of the group a remote request drills into.
    pub fn set_group_keys(&mut self, keys: Vec<String>) {
        self.group_keys = keys;
    }

    fn remote_page_size(&self) -> usize {
        self.page_size.unwrap_or(FALLBACK_REMOTE_PAGE_SIZE)
    }

    /// Build the request for the current state and supersede any in flight.
    pub fn begin_request(&mut self) -> PendingRequest {
        self.generation += 1;
        let size = self.remote_page_size();
        let start_row = self.current_page.saturating_sub(1).saturating_mul(size);
        PendingRequest {
            generation: self.generation,
            request: DataRequest {
                start_row,
                end_row: start_row.saturating_add(size),
                sort_state: self.effective_sort(),
                filter_state: self.effective_filter(),
                group_by: self.group_by.clone(),
                group_keys: self.group_keys.clone(),
            },
        }
    }

    /// Apply the outcome of a request issued under `generation`.
    ///
    /// Responses for superseded generations are discarded. A failed request
    /// leaves the current rows in place and returns the error.
    pub fn apply_response(&mut self, generation: u64, response: Result<DataResponse>) -> Result<DataChange> {
        if generation != self.generation {
            tracing::debug!(
                "Discarding stale response for generation {} (current {})",
                generation,
                self.generation
            );
            return Ok(DataChange::NONE);
        }
        let response = response?;
        Ok(self.set_data(response.data, Some(response.total_count)))
    }

    /// Issue the current request against a synchronous source.
    pub fn fetch(&mut self, source: &dyn RemoteDataSource) -> Result<DataChange> {
        let pending = self.begin_request();
        let response = source.get_data(&pending.request);
        self.apply_response(pending.generation, response)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ---- groups ----------------------------------------------------------

    /// Flip a group between expanded and collapsed. Returns the new expanded
    /// state, or `None` when no such group is shown.
    pub fn toggle_group(&mut self, path: &GroupPath) -> Option<bool> {
        if crate::types::find_group(&self.dataset.page_groups, path).is_none() {
            tracing::warn!("Ignoring toggle of unknown group {:?}", path.0);
            return None;
        }
        if self.collapsed.remove(path) {
            Some(true)
        } else {
            self.collapsed.insert(path.clone());
            Some(false)
        }
    }

    pub fn is_group_expanded(&self, path: &GroupPath) -> bool {
        !self.collapsed.contains(path)
    }

    pub fn expand_all_groups(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all_groups(&mut self) {
        fn walk(groups: &[GroupNode], out: &mut HashSet<GroupPath>) {
            for group in groups {
                out.insert(group.path.clone());
                if let GroupRows::Groups(children) = &group.rows {
                    walk(children, out);
                }
            }
        }
        walk(&self.dataset.page_groups, &mut self.collapsed);
    }

    pub fn collapsed_groups(&self) -> &HashSet<GroupPath> {
        &self.collapsed
    }

    // ---- row UI state ----------------------------------------------------

    /// Flip selection of one row; `None` for an unknown row.
    pub fn toggle_selected(&mut self, id: RowId) -> Option<bool> {
        if !self.ids.contains(&id) {
            return None;
        }
        let state = self.ui_state.entry(id).or_default();
        state.selected = !state.selected;
        let state = *state;
        self.patch_rows(|row| {
            if row.id == id {
                row.selected = state.selected;
            }
        });
        Some(state.selected)
    }

    /// Select or clear every row that passes the current filter.
    pub fn select_all(&mut self, selected: bool) {
        let ids: HashSet<RowId> = self.dataset.filtered.iter().map(|r| r.id).collect();
        for id in &ids {
            self.ui_state.entry(*id).or_default().selected = selected;
        }
        self.patch_rows(|row| {
            if ids.contains(&row.id) {
                row.selected = selected;
            }
        });
    }

    /// Flip nested-content expansion of one row.
    pub fn toggle_nested(&mut self, id: RowId) -> Option<bool> {
        if !self.ids.contains(&id) {
            return None;
        }
        let state = self.ui_state.entry(id).or_default();
        state.nested_expanded = !state.nested_expanded;
        let state = *state;
        self.patch_rows(|row| {
            if row.id == id {
                row.nested_expanded = state.nested_expanded;
            }
        });
        Some(state.nested_expanded)
    }

    pub fn row_ui_state(&self, id: RowId) -> RowUiState {
        self.ui_state.get(&id).copied().unwrap_or_default()
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.ids
            .iter()
            .copied()
            .filter(|id| self.ui_state.get(id).is_some_and(|s| s.selected))
            .collect()
    }

    fn patch_rows(&mut self, mut patch: impl FnMut(&mut RowWrapper)) {
        fn patch_groups(groups: &mut [GroupNode], patch: &mut impl FnMut(&mut RowWrapper)) {
            for group in groups {
                match &mut group.rows {
                    GroupRows::Rows(rows) => rows.iter_mut().for_each(&mut *patch),
                    GroupRows::Groups(children) => patch_groups(children, patch),
                }
            }
        }
        let ds = &mut self.dataset;
        for rows in [&mut ds.original, &mut ds.sorted, &mut ds.filtered, &mut ds.page_data] {
            rows.iter_mut().for_each(&mut patch);
        }
        patch_groups(&mut ds.groups, &mut patch);
        patch_groups(&mut ds.page_groups, &mut patch);
    }

    // ---- pipeline --------------------------------------------------------

    fn effective_sort(&self) -> SortState {
        self.sort_state
            .iter()
            .filter(|entry| self.is_known(&entry.field))
            .cloned()
            .collect()
    }

    fn effective_filter(&self) -> FilterState {
        self.filter_state
            .iter()
            .filter(|(field, _)| self.is_known(field))
            .map(|(field, condition)| (field.clone(), condition.clone()))
            .collect()
    }

    fn wrap_records(&self) -> Vec<RowWrapper> {
        self.records
            .iter()
            .zip(&self.ids)
            .enumerate()
            .map(|(index, (record, &id))| {
                let mut row = RowWrapper::data_row(id, index, Arc::clone(record), Arc::clone(&self.columns));
                if let Some(state) = self.ui_state.get(&id) {
                    row.selected = state.selected;
                    row.nested_expanded = state.nested_expanded;
                }
                row
            })
            .collect()
    }

    /// Re-run every stage from the original rows.
    fn recompute(&mut self) {
        let original = self.wrap_records();
        let (sorted, filtered) = if self.remote {
            (original.clone(), original.clone())
        } else {
            let mut sorted = original.clone();
            sort_rows(&mut sorted, &self.effective_sort(), self.comparator.as_deref());
            let filtered = filter_rows(&sorted, &self.effective_filter(), self.custom_filter.as_deref());
            (sorted, filtered)
        };

        let group_by = self.group_by.clone();
        let groups = group_rows(&filtered, &group_by);
        let ordered = if group_by.is_empty() {
            filtered.clone()
        } else {
            ordered_rows(&groups)
        };

        let total = self.server_total.unwrap_or(ordered.len());
        let page_size = if self.remote {
            Some(self.remote_page_size())
        } else {
            self.page_size
        };
        let pagination = Pagination::new(self.current_page, page_size, total);
        self.current_page = pagination.current_page;

        let page_data = if self.server_total.is_some() {
            ordered
        } else {
            ordered.get(pagination.bounds()).map(<[RowWrapper]>::to_vec).unwrap_or_default()
        };
        let page_groups = group_rows(&page_data, &group_by);
        let filler_rows = self.filler_wrappers(page_data.len(), !group_by.is_empty());

        self.dataset = GridDataset {
            original,
            sorted,
            filtered,
            groups,
            page_data,
            page_groups,
            header_row: Some(RowWrapper::synthetic(HEADER_ROW_ID, RowKind::Header, Arc::clone(&self.columns))),
            footer_row: Some(RowWrapper::synthetic(FOOTER_ROW_ID, RowKind::Footer, Arc::clone(&self.columns))),
            filler_rows,
            pinned_columns: self.pinned_columns.clone(),
            group_by,
            pagination,
            total_row_count: total,
            columns: Arc::clone(&self.columns),
        };
    }

    fn filler_wrappers(&self, page_len: usize, grouped: bool) -> Vec<RowWrapper> {
        let Some(size) = self.page_size.filter(|_| self.filler_rows && !grouped) else {
            return Vec::new();
        };
        (page_len..size)
            .map(|slot| {
                let offset = u64::try_from(slot).unwrap_or(u64::MAX);
                let id = RowId(FILLER_ROW_ID_BASE.saturating_sub(offset));
                RowWrapper::synthetic(id, RowKind::Filler, Arc::clone(&self.columns))
            })
            .collect()
    }

    // ---- accessors -------------------------------------------------------

    pub fn dataset(&self) -> &GridDataset {
        &self.dataset
    }

    pub fn sort_state(&self) -> &[SortEntry] {
        &self.sort_state
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn pagination(&self) -> Pagination {
        self.dataset.pagination
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Group tree to render, `None` when ungrouped.
    pub fn render_groups(&self) -> Option<&[GroupNode]> {
        if self.dataset.is_grouped() {
            Some(&self.dataset.page_groups)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::types::{ColumnDef, FilterCondition, FilterType};
    use serde_json::{json, Value};

    fn people() -> Vec<Value> {
        vec![
            json!({"name": "Cleo", "team": "red", "age": 31}),
            json!({"name": "Ada", "team": "blue", "age": 25}),
            json!({"name": "Bo", "team": "red", "age": 40}),
            json!({"name": "Dee", "team": "blue", "age": 19}),
            json!({"name": "Eli", "team": "green"}),
        ]
    }

    fn names(rows: &[RowWrapper]) -> Vec<String> {
        rows.iter().map(|r| value_text(r.value("name"))).collect()
    }

    fn engine_with(page_size: Option<usize>) -> GridDataEngine {
        let options = GridOptions {
            page_size,
            ..GridOptions::default()
        };
        let mut engine = GridDataEngine::new(&options);
        let layout = ColumnLayout::new(
            &[ColumnDef::leaf("name"), ColumnDef::leaf("team"), ColumnDef::leaf("age")],
            &options,
        );
        engine.sync_columns(&layout);
        engine.set_data(people(), None);
        engine
    }

    #[test]
    fn test_sort_resets_page_and_scroll() {
        let mut engine = engine_with(Some(2));
        engine.select_page(2);
        assert_eq!(engine.pagination().current_page, 2);

        let change = engine.apply_sorting(vec![SortEntry::asc("name")]);
        assert!(change.scroll_reset);
        assert_eq!(engine.pagination().current_page, 1);
        assert_eq!(names(&engine.dataset().page_data), vec!["Ada", "Bo"]);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let mut engine = engine_with(None);
        engine.apply_sorting(vec![SortEntry::asc("age")]);
        assert_eq!(names(&engine.dataset().sorted)[0], "Eli");
    }

    #[test]
    fn test_filter_union_and_total() {
        let mut engine = engine_with(Some(10));
        let mut filter = FilterState::new();
        filter.insert("team".into(), FilterCondition::new(FilterType::Equals, json!("green")));
        filter.insert("age".into(), FilterCondition::new(FilterType::GreaterThan, json!(35)));
        engine.apply_filter(filter);
        assert_eq!(names(&engine.dataset().page_data), vec!["Bo", "Eli"]);
        assert_eq!(engine.dataset().total_row_count, 2);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut engine = engine_with(None);
        engine.apply_sorting(vec![SortEntry::desc("salary"), SortEntry::asc("name")]);
        assert_eq!(names(&engine.dataset().page_data)[0], "Ada");

        let mut filter = FilterState::new();
        filter.insert("salary".into(), FilterCondition::new(FilterType::Equals, json!(1)));
        engine.apply_filter(filter);
        assert_eq!(engine.dataset().total_row_count, 5);

        assert_eq!(engine.add_group_by_column("salary"), DataChange::NONE);
        assert!(engine.group_by().is_empty());
    }

    #[test]
    fn test_paging_slices_sorted_filtered_sequence() {
        let mut engine = engine_with(Some(2));
        engine.apply_sorting(vec![SortEntry::asc("name")]);
        engine.select_page(3);
        let page = engine.pagination();
        assert_eq!((page.start_row, page.end_row, page.total_pages), (5, 5, 3));
        assert_eq!(names(&engine.dataset().page_data), vec!["Eli"]);
    }

    #[test]
    fn test_grouping_builds_tree_and_pages_group_order() {
        let mut engine = engine_with(Some(3));
        engine.add_group_by_column("team");
        let ds = engine.dataset();
        assert_eq!(ds.groups.len(), 3);
        assert_eq!(ds.groups[0].key, "red");
        assert_eq!(names(&ds.page_data), vec!["Cleo", "Bo", "Ada"]);
        let rendered = engine.render_groups().unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].row_count(), 1);
    }

    #[test]
    fn test_remove_group_by_restores_flat_view() {
        let mut engine = engine_with(None);
        engine.add_group_by_column("team");
        engine.remove_group_by_column("team");
        assert!(engine.render_groups().is_none());
        assert_eq!(names(&engine.dataset().page_data)[0], "Cleo");
    }

    #[test]
    fn test_ui_state_survives_rederivation() {
        let mut engine = engine_with(None);
        let ada = engine.dataset().page_data[1].id;
        assert_eq!(engine.toggle_selected(ada), Some(true));
        engine.apply_sorting(vec![SortEntry::asc("name")]);
        let first = &engine.dataset().page_data[0];
        assert_eq!(first.id, ada);
        assert!(first.selected);
        assert_eq!(engine.selected_ids(), vec![ada]);
    }

    #[test]
    fn test_row_key_keeps_identity_across_reload() {
        let options = GridOptions {
            row_key: Some("name".into()),
            ..GridOptions::default()
        };
        let mut engine = GridDataEngine::new(&options);
        engine.set_data(people(), None);
        let bo = engine.dataset().page_data[2].id;
        engine.toggle_nested(bo);
        engine.set_data(vec![json!({"name": "Bo", "team": "red"})], None);
        let row = &engine.dataset().page_data[0];
        assert_eq!(row.id, bo);
        assert!(row.nested_expanded);
    }

    #[test]
    fn test_row_key_forgets_removed_keys() {
        let options = GridOptions {
            row_key: Some("name".into()),
            ..GridOptions::default()
        };
        let mut engine = GridDataEngine::new(&options);
        engine.set_data(people(), None);
        let bo = engine.dataset().page_data[2].id;
        engine.toggle_selected(bo);
        engine.set_data(vec![json!({"name": "Ada", "team": "red"})], None);
        assert_eq!(engine.key_ids.len(), 1);
        assert!(engine.selected_ids().is_empty());

        engine.set_data(people(), None);
        let row = &engine.dataset().page_data[2];
        assert_ne!(row.id, bo);
        assert!(!row.selected);
    }

    #[test]
    fn test_empty_data_resets_everything() {
        let mut engine = engine_with(Some(2));
        engine.select_page(3);
        engine.set_data(Vec::new(), None);
        let ds = engine.dataset();
        assert!(ds.page_data.is_empty());
        assert_eq!(ds.total_row_count, 0);
        assert_eq!(ds.pagination.current_page, 1);
    }

    #[test]
    fn test_server_total_skips_client_paging() {
        let mut engine = engine_with(Some(2));
        engine.set_data(people(), Some(120));
        let ds = engine.dataset();
        assert_eq!(ds.page_data.len(), 5);
        assert_eq!(ds.total_row_count, 120);
        assert_eq!(ds.pagination.total_pages, 60);
    }

    #[test]
    fn test_filler_rows_pad_short_page() {
        let options = GridOptions {
            page_size: Some(4),
            filler_rows: true,
            ..GridOptions::default()
        };
        let mut engine = GridDataEngine::new(&options);
        engine.set_data(people(), None);
        engine.select_page(2);
        let ds = engine.dataset();
        assert_eq!(ds.page_data.len(), 1);
        assert_eq!(ds.filler_rows.len(), 3);
        assert!(ds.filler_rows.iter().all(|r| r.kind == RowKind::Filler));
    }

    #[test]
    fn test_group_toggle_and_collapse_all() {
        let mut engine = engine_with(None);
        engine.add_group_by_column("team");
        let red = GroupPath::from(vec!["red"]);
        assert_eq!(engine.toggle_group(&red), Some(false));
        assert!(!engine.is_group_expanded(&red));
        assert_eq!(engine.toggle_group(&red), Some(true));
        assert_eq!(engine.toggle_group(&GroupPath::from(vec!["purple"])), None);
        engine.collapse_all_groups();
        assert_eq!(engine.collapsed_groups().len(), 3);
        engine.expand_all_groups();
        assert!(engine.collapsed_groups().is_empty());
    }

    #[test]
    fn test_remote_stale_response_discarded() {
        let mut engine = engine_with(Some(2));
        engine.set_remote(true);
        let change = engine.apply_sorting(vec![SortEntry::desc("age")]);
        assert!(change.needs_fetch);

        let first = engine.begin_request();
        let second = engine.begin_request();
        assert_eq!(second.request.sort_state, vec![SortEntry::desc("age")]);

        let stale = engine
            .apply_response(first.generation, Ok(DataResponse { data: vec![json!({"name": "Old"})], total_count: 1 }))
            .unwrap();
        assert!(!stale.recomputed);
        assert_ne!(names(&engine.dataset().page_data), vec!["Old"]);

        engine
            .apply_response(
                second.generation,
                Ok(DataResponse { data: vec![json!({"name": "New"})], total_count: 9 }),
            )
            .unwrap();
        assert_eq!(names(&engine.dataset().page_data), vec!["New"]);
        assert_eq!(engine.dataset().total_row_count, 9);
    }

    #[test]
    fn test_remote_failure_keeps_rows() {
        let mut engine = engine_with(Some(2));
        engine.set_remote(true);
        let failing = |_: &DataRequest| -> Result<DataResponse> { Err(GridError::Remote("offline".into())) };
        assert!(engine.fetch(&failing).is_err());
        assert_eq!(engine.row_count(), 5);
    }

    #[test]
    fn test_remote_request_offsets() {
        let mut engine = engine_with(Some(10));
        engine.set_remote(true);
        let source = |request: &DataRequest| -> Result<DataResponse> {
            assert_eq!((request.start_row, request.end_row), (0, 10));
            Ok(DataResponse { data: people(), total_count: 45 })
        };
        engine.fetch(&source).unwrap();
        engine.select_page(3);
        let pending = engine.begin_request();
        assert_eq!((pending.request.start_row, pending.request.end_row), (20, 30));
    }
}
