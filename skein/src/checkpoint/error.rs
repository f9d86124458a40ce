//! `CheckpointError` (spec §4.1, §7).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CheckpointError {
    #[error("checkpoint store unavailable: {0}")]
    Unavailable(String),
    #[error("checkpoint payload corrupt: {0}")]
    Corrupt(String),
    #[error("checkpoint ttl expired")]
    TtlExpired,
}
