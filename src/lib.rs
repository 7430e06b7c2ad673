//! vgrid - virtualized data grid core for the web
//!
//! Drives a data grid rendered by a JS host via WebAssembly:
//! - Sort, filter, group and paginate records locally or through a remote source
//! - Variable-height row virtualization with a bounded measure/correct loop
//! - Scroll synchronization across header, body, footer and scrollbar panes
//! - Hierarchical columns with pinning, widths and grouped header rows
//! - Plugins observing lifecycle events and saved column/sort/group state
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DataGrid } from 'vgrid';
//! await init();
//! const grid = new DataGrid({ columns, rowHeight: 36 });
//! grid.attach(header, body, footer, scrollbar);
//! grid.set_render_callback(() => draw(JSON.parse(grid.render_state())));
//! grid.set_data(rows);
//! ```

// Grid engine
pub mod columns;
pub mod data;
pub mod error;
pub mod plugins;
pub mod state;
pub mod types;

// Windowing and host bindings
pub mod layout;
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export the main grid handle
pub use viewer::DataGrid;

pub use types::*;

/// Sort, filter, group and page `rows` with `options` and return the derived
/// dataset as JSON. Useful for hosts that only need the data pipeline.
///
/// # Errors
/// Returns an error if the options or rows cannot be parsed.
#[wasm_bindgen]
pub fn process_rows(rows_json: &str, options_json: &str) -> Result<String, JsValue> {
    Ok(process_rows_json(rows_json, options_json)?)
}

/// Non-wasm entry for [`process_rows`].
///
/// # Errors
/// Returns an error if the rows cannot be parsed. Invalid options fall back
/// to defaults.
pub fn process_rows_json(rows_json: &str, options_json: &str) -> error::Result<String> {
    let options = GridOptions::from_json(options_json);
    let rows: Vec<Record> = serde_json::from_str(rows_json)?;
    let columns = columns::ColumnLayout::new(&options.columns, &options);
    let mut engine = data::GridDataEngine::new(&options);
    engine.sync_columns(&columns);
    engine.set_data(rows, None);
    Ok(serde_json::to_string(engine.dataset())?)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
