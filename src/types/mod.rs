//! Data types for the grid engine.

mod column;
mod filter;
mod group;
mod options;
mod row;
mod scroll;

pub use column::*;
pub use filter::*;
pub use group::*;
pub use options::*;
pub use row::*;
pub use scroll::*;
