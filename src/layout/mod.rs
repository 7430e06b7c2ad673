//! Row virtualization: flattening, height cache, window selection and
//! viewport state.
//!
//! This module handles:
//! - Walking the grouped or flat page into renderable entries
//! - Caching measured heights with a default for unmeasured rows
//! - Prefix sums and binary search for window selection
//! - The bounded measure/correct loop

mod flatten;
mod row_heights;
mod viewport;
mod virtualizer;

pub use flatten::{flatten, FlatEntry, FlattenSource};
pub use row_heights::{HeightKey, RowHeightCache};
pub use viewport::Viewport;
pub use virtualizer::{RowVirtualizer, RowWindow, SettleOutcome};
