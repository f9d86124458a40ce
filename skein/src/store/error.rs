//! `StoreError`: the datastore's own failure kind, wrapped into `ToolError::unavailable`/
//! `ToolError::internal` at the tool-handler boundary (spec §7 "ToolError" taxonomy).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
    #[error("datastore returned malformed data: {0}")]
    Corrupt(String),
}
