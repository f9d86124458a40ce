//! Session Checkpointer (spec §4.1): atomic load/store of full conversation state keyed by a
//! session identifier, with bounded lifetime.

mod error;
mod memory_saver;
mod sqlite_saver;

pub use error::CheckpointError;
pub use memory_saver::MemorySaver;
pub use sqlite_saver::SqliteSaver;

use async_trait::async_trait;

use crate::health::HealthStatus;
use crate::state::SessionState;

/// Spec §4.1 contract: `load`, `save`, `delete`, `health`.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, CheckpointError>;

    /// `ttl_seconds` of 0 means "never expires" (used by a couple of tests); production
    /// callers always pass `STATE_TTL_SECONDS`.
    async fn save(
        &self,
        session_id: &str,
        state: &SessionState,
        ttl_seconds: u64,
    ) -> Result<(), CheckpointError>;

    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError>;

    async fn health(&self) -> HealthStatus;
}
