//! Server-side data source contract.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{FilterState, Record, SortState};

/// What the grid asks a remote source for. Offsets are 0-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub start_row: usize,
    pub end_row: usize,
    pub sort_state: SortState,
    pub filter_state: FilterState,
    pub group_by: Vec<String>,
    /// Keys of the group being drilled into, outermost first
    pub group_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub data: Vec<Record>,
    pub total_count: usize,
}

/// A request tagged with the generation it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub generation: u64,
    pub request: DataRequest,
}

/// Synchronous data source; the wasm binding drives asynchronous ones itself.
pub trait RemoteDataSource {
    fn get_data(&self, request: &DataRequest) -> Result<DataResponse>;
}

impl<F> RemoteDataSource for F
where
    F: Fn(&DataRequest) -> Result<DataResponse>,
{
    fn get_data(&self, request: &DataRequest) -> Result<DataResponse> {
        self(request)
    }
}
