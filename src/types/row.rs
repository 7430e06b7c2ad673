use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ColumnId;

/// A raw data record as supplied by the caller (normally a JSON object).
pub type Record = Value;

/// Generated stable identity of a row within one grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a wrapper renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Data,
    Header,
    Footer,
    /// Padding row that keeps a short page at full height
    Filler,
}

/// Transient UI state that survives pipeline re-derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowUiState {
    pub selected: bool,
    pub nested_expanded: bool,
}

/// One row as handed to the render host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowWrapper {
    pub id: RowId,
    pub kind: RowKind,
    /// Position of the record in the original data array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Arc<Record>>,
    /// Leaf columns this row was derived against
    #[serde(skip)]
    pub columns: Arc<[ColumnId]>,
    pub selected: bool,
    pub nested_expanded: bool,
}

impl RowWrapper {
    pub fn data_row(id: RowId, source_index: usize, data: Arc<Record>, columns: Arc<[ColumnId]>) -> Self {
        Self {
            id,
            kind: RowKind::Data,
            source_index: Some(source_index),
            data: Some(data),
            columns,
            selected: false,
            nested_expanded: false,
        }
    }

    /// Header, footer or filler row without a record.
    pub fn synthetic(id: RowId, kind: RowKind, columns: Arc<[ColumnId]>) -> Self {
        Self {
            id,
            kind,
            source_index: None,
            data: None,
            columns,
            selected: false,
            nested_expanded: false,
        }
    }

    /// Value of `field` in the wrapped record (`None` when absent).
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.as_deref().and_then(|record| field_value(record, field))
    }

    pub fn ui_state(&self) -> RowUiState {
        RowUiState {
            selected: self.selected,
            nested_expanded: self.nested_expanded,
        }
    }

    /// Copy of this wrapper carrying `state`.
    pub fn with_ui_state(&self, state: RowUiState) -> Self {
        Self {
            selected: state.selected,
            nested_expanded: state.nested_expanded,
            ..self.clone()
        }
    }
}

/// Resolve a possibly dotted field path (`address.city`) inside a record.
pub fn field_value<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(direct) = record.get(field) {
        return Some(direct);
    }
    if !field.contains('.') {
        return None;
    }
    field
        .split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

/// Render a value as the text used for text predicates and group keys.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_direct_and_dotted() {
        let record = json!({"name": "Ada", "address": {"city": "London"}, "a.b": 1});
        assert_eq!(field_value(&record, "name"), Some(&json!("Ada")));
        assert_eq!(field_value(&record, "address.city"), Some(&json!("London")));
        assert_eq!(field_value(&record, "a.b"), Some(&json!(1)));
        assert_eq!(field_value(&record, "address.zip"), None);
        assert_eq!(field_value(&record, "missing"), None);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(None), "");
        assert_eq!(value_text(Some(&Value::Null)), "");
        assert_eq!(value_text(Some(&json!("x"))), "x");
        assert_eq!(value_text(Some(&json!(4))), "4");
        assert_eq!(value_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_ui_state_copied_forward() {
        let columns: Arc<[ColumnId]> = Arc::from(Vec::new());
        let row = RowWrapper::data_row(RowId(1), 0, Arc::new(json!({})), columns);
        let copied = row.with_ui_state(RowUiState {
            selected: true,
            nested_expanded: true,
        });
        assert_eq!(copied.id, row.id);
        assert!(copied.selected);
        assert!(copied.nested_expanded);
    }
}
