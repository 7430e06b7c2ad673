//! Multi-key sorting.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{RowWrapper, SortDirection, SortEntry};

/// Caller-registered comparison; receives the two field values (absent when
/// the record lacks the field) and the entry being applied. Direction is
/// applied by the engine afterwards.
pub type Comparator = dyn Fn(Option<&Value>, Option<&Value>, &SortEntry) -> Ordering;

/// Numeric view of a value: numbers, and strings that parse as numbers.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => str_number(s),
        _ => None,
    }
}

fn str_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Default ordering: missing/null lowest, numbers numerically, then strings.
/// Numeric strings sort numerically ahead of all other strings, which
/// compare case-insensitively.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            let by_text = || x.to_lowercase().cmp(&y.to_lowercase()).then_with(|| x.cmp(y));
            match (str_number(x), str_number(y)) {
                (Some(nx), Some(ny)) => nx
                    .partial_cmp(&ny)
                    .unwrap_or(Ordering::Equal)
                    .then_with(by_text),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => by_text(),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => {
            let by_rank = type_rank(Some(x)).cmp(&type_rank(Some(y)));
            if by_rank == Ordering::Equal {
                x.to_string().cmp(&y.to_string())
            } else {
                by_rank
            }
        }
    }
}

/// Compare two rows under a sort state; later entries break ties.
pub fn compare_rows(
    a: &RowWrapper,
    b: &RowWrapper,
    sort: &[SortEntry],
    comparator: Option<&Comparator>,
) -> Ordering {
    for entry in sort {
        let va = a.value(&entry.field);
        let vb = b.value(&entry.field);
        let ordering = match comparator {
            Some(custom) => custom(va, vb, entry),
            None => compare_values(va, vb),
        };
        let ordering = match entry.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of `rows` under `sort`.
pub fn sort_rows(rows: &mut [RowWrapper], sort: &[SortEntry], comparator: Option<&Comparator>) {
    if sort.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, sort, comparator));
}
