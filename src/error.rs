//! Structured error types for vgrid.
//!
//! Most failures inside the engines are degraded and logged rather than
//! returned; the variants here are what reaches a caller.

/// All errors that can surface from vgrid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// An operation referenced a column id or field that does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// An operation referenced a group path that does not exist.
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// The remote data source reported a failure.
    #[error("Remote data request failed: {0}")]
    Remote(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for GridError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::Other(format!("Serialization error: {e}"))
    }
}

impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
