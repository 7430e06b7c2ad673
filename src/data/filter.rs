//! Field filters with union semantics across fields.

use std::cmp::Ordering;

use serde_json::Value;

use super::sort::{as_number, compare_values};
use crate::types::{value_text, FilterCondition, FilterState, FilterType, RowWrapper};

/// Caller-registered row predicate; replaces the default matching entirely.
pub type FilterFn = dyn Fn(&RowWrapper, &FilterState) -> bool;

/// False for binary predicates whose comparison value is empty; such a
/// condition does not restrict anything.
pub fn is_active(condition: &FilterCondition) -> bool {
    if condition.filter_type.is_unary() {
        return true;
    }
    match &condition.value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn values_equal(value: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = value else {
        return expected.is_null();
    };
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a.partial_cmp(&b) == Some(Ordering::Equal);
    }
    if let (Value::Bool(a), Value::Bool(b)) = (actual, expected) {
        return a == b;
    }
    value_text(Some(actual)).to_lowercase() == value_text(Some(expected)).to_lowercase()
}

fn ordering(value: Option<&Value>, expected: &Value) -> Option<Ordering> {
    let actual = value.filter(|v| !v.is_null())?;
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a.partial_cmp(&b);
    }
    Some(compare_values(Some(actual), Some(expected)))
}

/// Evaluate one condition against a field value.
pub fn matches_condition(value: Option<&Value>, condition: &FilterCondition) -> bool {
    let expected = &condition.value;
    let text = || value_text(value).to_lowercase();
    let needle = || value_text(Some(expected)).to_lowercase();
    match condition.filter_type {
        FilterType::Equals => values_equal(value, expected),
        FilterType::NotEqual => !values_equal(value, expected),
        FilterType::Contains => text().contains(&needle()),
        FilterType::NotContain => !text().contains(&needle()),
        FilterType::StartsWith => text().starts_with(&needle()),
        FilterType::EndsWith => text().ends_with(&needle()),
        FilterType::GreaterThan => ordering(value, expected) == Some(Ordering::Greater),
        FilterType::GreaterThanOrEqual => {
            matches!(ordering(value, expected), Some(Ordering::Greater | Ordering::Equal))
        }
        FilterType::LessThan => ordering(value, expected) == Some(Ordering::Less),
        FilterType::LessThanOrEqual => {
            matches!(ordering(value, expected), Some(Ordering::Less | Ordering::Equal))
        }
        FilterType::IsNull => value.map_or(true, Value::is_null),
        FilterType::IsNotNull => value.is_some_and(|v| !v.is_null()),
        FilterType::IsEmpty => is_empty_value(value),
        FilterType::IsNotEmpty => !is_empty_value(value),
    }
}

/// A row passes when ANY active condition passes (union across fields).
/// With no active condition every row passes.
pub fn row_matches(row: &RowWrapper, state: &FilterState) -> bool {
    let mut active = state.iter().filter(|(_, c)| is_active(c)).peekable();
    if active.peek().is_none() {
        return true;
    }
    active.any(|(field, condition)| matches_condition(row.value(field), condition))
}

/// Rows passing `state`, in input order.
pub fn filter_rows(rows: &[RowWrapper], state: &FilterState, custom: Option<&FilterFn>) -> Vec<RowWrapper> {
    if state.is_empty() && custom.is_none() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| match custom {
            Some(predicate) => predicate(row, state),
            None => row_matches(row, state),
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ColumnId, RowId};
    use serde_json::json;
    use std::sync::Arc;

    fn row(record: Value) -> RowWrapper {
        let columns: Arc<[ColumnId]> = Arc::from(Vec::new());
        RowWrapper::data_row(RowId(0), 0, Arc::new(record), columns)
    }

    fn cond(filter_type: FilterType, value: Value) -> FilterCondition {
        FilterCondition::new(filter_type, value)
    }

    #[test]
    fn test_text_predicates_case_insensitive() {
        let v = json!("Hello World");
        assert!(matches_condition(Some(&v), &cond(FilterType::Contains, json!("world"))));
        assert!(!matches_condition(Some(&v), &cond(FilterType::NotContain, json!("WORLD"))));
        assert!(matches_condition(Some(&v), &cond(FilterType::StartsWith, json!("hello"))));
        assert!(matches_condition(Some(&v), &cond(FilterType::EndsWith, json!("LD"))));
        assert!(matches_condition(Some(&v), &cond(FilterType::Equals, json!("hello world"))));
    }

    #[test]
    fn test_numeric_predicates() {
        let v = json!(42);
        assert!(matches_condition(Some(&v), &cond(FilterType::GreaterThan, json!(10))));
        assert!(matches_condition(Some(&v), &cond(FilterType::GreaterThan, json!("9"))));
        assert!(matches_condition(Some(&v), &cond(FilterType::LessThanOrEqual, json!(42))));
        assert!(!matches_condition(Some(&v), &cond(FilterType::LessThan, json!(42))));
        assert!(matches_condition(Some(&v), &cond(FilterType::Equals, json!("42"))));
        assert!(!matches_condition(None, &cond(FilterType::GreaterThan, json!(0))));
    }

    #[test]
    fn test_null_and_empty_predicates() {
        let null = FilterCondition::unary(FilterType::IsNull);
        let empty = FilterCondition::unary(FilterType::IsEmpty);
        assert!(matches_condition(None, &null));
        assert!(matches_condition(Some(&Value::Null), &null));
        assert!(!matches_condition(Some(&json!("")), &null));
        assert!(matches_condition(Some(&json!("  ")), &empty));
        assert!(matches_condition(Some(&json!([])), &empty));
        assert!(matches_condition(
            Some(&json!(0)),
            &FilterCondition::unary(FilterType::IsNotEmpty)
        ));
        assert!(matches_condition(
            Some(&json!("x")),
            &FilterCondition::unary(FilterType::IsNotNull)
        ));
    }

    #[test]
    fn test_union_across_fields() {
        let mut state = FilterState::new();
        state.insert("name".into(), cond(FilterType::Contains, json!("a")));
        state.insert("status".into(), cond(FilterType::Equals, json!("Active")));

        assert!(row_matches(&row(json!({"name": "Sam", "status": "Gone"})), &state));
        assert!(row_matches(&row(json!({"name": "Bob", "status": "Active"})), &state));
        assert!(!row_matches(&row(json!({"name": "Bob", "status": "Gone"})), &state));
    }

    #[test]
    fn test_inactive_conditions_ignored() {
        let mut state = FilterState::new();
        state.insert("name".into(), cond(FilterType::Contains, json!("")));
        assert!(row_matches(&row(json!({"name": "Bob"})), &state));
    }

    #[test]
    fn test_custom_filter_wins() {
        let rows = vec![row(json!({"n": 1})), row(json!({"n": 2}))];
        let mut state = FilterState::new();
        state.insert("n".into(), cond(FilterType::Equals, json!(1)));
        let only_two = |r: &RowWrapper, _: &FilterState| r.value("n") == Some(&json!(2));
        let out = filter_rows(&rows, &state, Some(&only_two));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value("n"), Some(&json!(2)));
    }
}
