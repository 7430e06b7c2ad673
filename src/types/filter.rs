use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction for one sort entry
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One `(column, direction)` pair; later entries break ties of earlier ones.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    /// Field of the sorted column
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort state
pub type SortState = Vec<SortEntry>;

/// Predicate applied to one field
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Equals,
    NotEqual,
    Contains,
    NotContain,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl FilterType {
    /// True for predicates that ignore the comparison value.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty
        )
    }
}

/// `{ type, value }` for one field
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub value: Value,
}

impl FilterCondition {
    pub fn new(filter_type: FilterType, value: impl Into<Value>) -> Self {
        Self {
            filter_type,
            value: value.into(),
        }
    }

    pub fn unary(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            value: Value::Null,
        }
    }
}

/// Field name -> condition. Ordered so requests and saved state are stable.
pub type FilterState = BTreeMap<String, FilterCondition>;
