//! In-memory checkpointer (spec §4.1), grounded on `loom::memory::MemorySaver` — dev/test use,
//! no cross-process durability.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CheckpointError, Checkpointer};
use crate::health::HealthStatus;
use crate::state::SessionState;

struct Entry {
    state: SessionState,
    expires_at: Option<Instant>,
}

/// In-memory, TTL-bounded session store (spec §3.3, §8 "TTL expiry" properties).
#[derive(Default)]
pub struct MemorySaver {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, CheckpointError> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(session_id) else {
            return Ok(None);
        };
        if let Some(expires_at) = entry.expires_at {
            if Instant::now() >= expires_at {
                entries.remove(session_id);
                return Ok(None);
            }
        }
        Ok(Some(entry.state.clone()))
    }

    async fn save(
        &self,
        session_id: &str,
        state: &SessionState,
        ttl_seconds: u64,
    ) -> Result<(), CheckpointError> {
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(Instant::now() + Duration::from_secs(ttl_seconds))
        };
        self.entries.write().await.insert(
            session_id.to_string(),
            Entry {
                state: state.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError> {
        self.entries.write().await.remove(session_id);
        Ok(())
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::Ok
    }
}
