use serde::{Deserialize, Serialize};

/// Stable identifier of a column definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Caller-supplied column definition.
///
/// Definitions form a tree through `children`. A node is a leaf iff it has no
/// children, and only leaves carry a `field`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Stable id (falls back to the field, then the label, when omitted)
    #[serde(default)]
    pub id: String,
    /// Record field rendered by this column (leaves only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    /// Header label
    #[serde(default)]
    pub label: String,
    /// Explicit width, e.g. "120px"
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<String>,
    /// Width computed by the host after content measurement; wins over `width`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dynamic_width: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub pinned: bool,
    /// Set when the column takes part in row grouping
    #[serde(default)]
    pub group_by: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Computed: final pinned leaf in display order
    #[serde(default)]
    pub last_pinned: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ColumnDef>,
}

fn default_true() -> bool {
    true
}

impl Default for ColumnDef {
    fn default() -> Self {
        Self {
            id: String::new(),
            field: None,
            label: String::new(),
            width: None,
            dynamic_width: None,
            visible: true,
            pinned: false,
            group_by: false,
            sortable: true,
            filterable: true,
            last_pinned: false,
            children: Vec::new(),
        }
    }
}

impl ColumnDef {
    /// Leaf column bound to `field`; id and label default to the field name.
    pub fn leaf(field: &str) -> Self {
        Self {
            id: field.to_string(),
            field: Some(field.to_string()),
            label: field.to_string(),
            ..Self::default()
        }
    }

    /// Group header with the given children.
    pub fn group(id: &str, label: &str, children: Vec<ColumnDef>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            children,
            ..Self::default()
        }
    }

    pub fn with_width(mut self, width: &str) -> Self {
        self.width = Some(width.to_string());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Id used for this definition, deriving one when the caller left it empty.
    pub fn resolved_id(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        if let Some(field) = &self.field {
            return field.clone();
        }
        self.label.clone()
    }
}

/// Parse a CSS pixel width such as "120px" or "120".
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}

/// Format a pixel value the way widths are exchanged with the host.
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}
