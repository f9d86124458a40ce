//! `OrchestratorError` (spec §7): only transport-level failures surface here — everything else
//! is absorbed lower in the stack and recorded in the state's trace.

use thiserror::Error;

use crate::checkpoint::CheckpointError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("another turn is already in progress for this session")]
    ConcurrentTurn,
    #[error("admission queue is full")]
    Overloaded,
    #[error("checkpoint store unavailable: {0}")]
    CheckpointUnavailable(String),
    #[error("turn exceeded its wall-clock budget")]
    Timeout,
}

impl From<CheckpointError> for OrchestratorError {
    /// `Corrupt` is handled by starting fresh (spec §7); only `Unavailable`/`TtlExpired` reach
    /// here as a surfaced transport failure.
    fn from(e: CheckpointError) -> Self {
        OrchestratorError::CheckpointUnavailable(e.to_string())
    }
}
