//! SQLite-backed checkpointer. Persistent across process restarts.
//!
//! Grounded on `loom::memory::sqlite_saver::SqliteSaver`: opens a fresh `rusqlite::Connection`
//! per operation inside `tokio::task::spawn_blocking` rather than holding one in the struct,
//! since `rusqlite::Connection` is `!Sync`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::params;

use super::{CheckpointError, Checkpointer};
use crate::health::HealthStatus;
use crate::state::SessionState;

/// Key: `session_id`. One row per session; `save` overwrites.
pub struct SqliteSaver {
    db_path: PathBuf,
}

impl SqliteSaver {
    /// Opens (creating if needed) the backing file and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path)
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session_checkpoints (
                session_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                saved_at_unix INTEGER NOT NULL,
                expires_at_unix INTEGER
            )
            "#,
            [],
        )
        .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        Ok(Self { db_path })
    }
}

#[async_trait::async_trait]
impl Checkpointer for SqliteSaver {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, CheckpointError> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();
        let now = Utc::now().timestamp();

        let row: Option<(String, Option<i64>)> = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            let mut stmt = conn
                .prepare(
                    "SELECT payload, expires_at_unix FROM session_checkpoints WHERE session_id = ?1",
                )
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            let mut rows = stmt
                .query(params![session_id])
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            match rows
                .next()
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?
            {
                Some(row) => {
                    let payload: String =
                        row.get(0).map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
                    let expires_at: Option<i64> =
                        row.get(1).map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
                    Ok(Some((payload, expires_at)))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| CheckpointError::Unavailable(e.to_string()))??;

        let Some((payload, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            if now >= expires_at {
                self.delete(&session_id).await?;
                return Ok(None);
            }
        }

        let state: SessionState = serde_json::from_str(&payload)
            .map_err(|e| CheckpointError::Corrupt(e.to_string()))?;
        Ok(Some(state))
    }

    async fn save(
        &self,
        session_id: &str,
        state: &SessionState,
        ttl_seconds: u64,
    ) -> Result<(), CheckpointError> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();
        let payload = serde_json::to_string(state)
            .map_err(|e| CheckpointError::Corrupt(e.to_string()))?;
        let now = Utc::now().timestamp();
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(now + ttl_seconds as i64)
        };

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            conn.execute(
                r#"
                INSERT INTO session_checkpoints (session_id, payload, saved_at_unix, expires_at_unix)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(session_id) DO UPDATE SET
                    payload = excluded.payload,
                    saved_at_unix = excluded.saved_at_unix,
                    expires_at_unix = excluded.expires_at_unix
                "#,
                params![session_id, payload, now, expires_at],
            )
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(|e| CheckpointError::Unavailable(e.to_string()))??;

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            conn.execute(
                "DELETE FROM session_checkpoints WHERE session_id = ?1",
                params![session_id],
            )
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(|e| CheckpointError::Unavailable(e.to_string()))??;
        Ok(())
    }

    async fn health(&self) -> HealthStatus {
        let db_path = self.db_path.clone();
        let result = tokio::task::spawn_blocking(move || {
            rusqlite::Connection::open(&db_path).and_then(|c| c.execute_batch("SELECT 1"))
        })
        .await;
        match result {
            Ok(Ok(())) => HealthStatus::Ok,
            _ => HealthStatus::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoints.db");
        (dir, path)
    }

    /// **Scenario**: save then load round-trips across a fresh connection open.
    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let (_dir, path) = tmp_db();
        let saver = SqliteSaver::new(&path).unwrap();
        let state = SessionState::new("s1", "u1", "ws1");
        saver.save("s1", &state, 86_400).await.unwrap();
        let loaded = saver.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.session_id, "s1");
    }

    /// **Scenario**: saving twice for the same session overwrites rather than erroring.
    #[tokio::test]
    async fn save_twice_overwrites() {
        let (_dir, path) = tmp_db();
        let saver = SqliteSaver::new(&path).unwrap();
        let mut state = SessionState::new("s1", "u1", "ws1");
        saver.save("s1", &state, 86_400).await.unwrap();
        state.turn_count = 5;
        saver.save("s1", &state, 86_400).await.unwrap();
        let loaded = saver.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.turn_count, 5);
    }

    /// **Scenario**: an expired row behaves as NotFound and is deleted on read.
    #[tokio::test]
    async fn expired_row_returns_none() {
        let (_dir, path) = tmp_db();
        let saver = SqliteSaver::new(&path).unwrap();
        let state = SessionState::new("s1", "u1", "ws1");
        // ttl_seconds = 0 means "never expires" in this crate's convention; to exercise
        // expiry we save with 1s then wait.
        saver.save("s1", &state, 1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(saver.load("s1").await.unwrap().is_none());
    }

    /// **Scenario**: health() reports Ok against a reachable database file.
    #[tokio::test]
    async fn health_ok_against_reachable_db() {
        let (_dir, path) = tmp_db();
        let saver = SqliteSaver::new(&path).unwrap();
        assert_eq!(saver.health().await, HealthStatus::Ok);
    }
}
