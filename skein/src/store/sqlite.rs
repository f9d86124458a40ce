//! `Datastore`: SQLite-backed relational store for the built-in tools.
//!
//! Grounded on the same open-connection-per-operation + `spawn_blocking` pattern as
//! [`crate::checkpoint::SqliteSaver`] (itself grounded on `loom::memory::sqlite_saver`):
//! `rusqlite::Connection` is `!Sync`, so the struct holds only a `db_path` and opens a fresh
//! connection per call.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use super::error::StoreError;
use super::schema::CREATE_TABLES;
use crate::health::HealthStatus;

#[derive(Debug, Clone)]
pub struct FoodLog {
    pub id: String,
    pub item: String,
    pub meal: Option<String>,
    pub logged_at_unix: i64,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_at_unix: Option<i64>,
    pub priority: String,
    pub completed: bool,
    pub created_at_unix: i64,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub starts_at_unix: i64,
    pub recurrence: Option<String>,
    pub last_expanded_unix: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: String,
    pub message: String,
    pub fire_at_unix: i64,
    pub fired: bool,
}

#[derive(Debug, Clone)]
pub struct JobState {
    pub job_name: String,
    pub last_run_unix: Option<i64>,
    pub last_status: Option<String>,
}

pub struct Datastore {
    db_path: PathBuf,
}

impl Datastore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { db_path })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            f(&conn).map_err(|e| StoreError::Unavailable(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }

    pub async fn log_food(
        &self,
        user_id: &str,
        item: &str,
        meal: Option<&str>,
    ) -> Result<FoodLog, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let user_id = user_id.to_string();
        let item = item.to_string();
        let meal = meal.map(str::to_string);
        let id_out = id.clone();
        let item_out = item.clone();
        let meal_out = meal.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO food_logs (id, user_id, item, meal, logged_at_unix) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, item, meal, now],
            )?;
            Ok(())
        })
        .await?;

        Ok(FoodLog {
            id: id_out,
            item: item_out,
            meal: meal_out,
            logged_at_unix: now,
        })
    }

    pub async fn create_task(
        &self,
        user_id: &str,
        title: &str,
        due_at_unix: Option<i64>,
        priority: &str,
    ) -> Result<Task, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let user_id = user_id.to_string();
        let title = title.to_string();
        let priority = priority.to_string();
        let id_out = id.clone();
        let title_out = title.clone();
        let priority_out = priority.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, user_id, title, due_at_unix, priority, completed, created_at_unix)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                params![id, user_id, title, due_at_unix, priority, now],
            )?;
            Ok(())
        })
        .await?;

        Ok(Task {
            id: id_out,
            title: title_out,
            due_at_unix,
            priority: priority_out,
            completed: false,
            created_at_unix: now,
        })
    }

    /// Substring match over `title`, newest first, capped at `limit` (spec §8 scenario 3 —
    /// "retrieved ... via a `search_tasks` tool call").
    pub async fn search_tasks(&self, user_id: &str, query: &str, limit: i64) -> Result<Vec<Task>, StoreError> {
        let user_id = user_id.to_string();
        let pattern = format!("%{}%", query.to_lowercase());

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, due_at_unix, priority, completed, created_at_unix FROM tasks
                 WHERE user_id = ?1 AND lower(title) LIKE ?2
                 ORDER BY created_at_unix DESC LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![user_id, pattern, limit], |row| {
                Ok(Task {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    due_at_unix: row.get(2)?,
                    priority: row.get(3)?,
                    completed: row.get::<_, i64>(4)? != 0,
                    created_at_unix: row.get(5)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    pub async fn create_event(
        &self,
        user_id: &str,
        title: &str,
        starts_at_unix: i64,
        recurrence: Option<&str>,
    ) -> Result<Event, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let user_id = user_id.to_string();
        let title = title.to_string();
        let recurrence = recurrence.map(str::to_string);
        let id_out = id.clone();
        let user_id_out = user_id.clone();
        let title_out = title.clone();
        let recurrence_out = recurrence.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, title, starts_at_unix, recurrence, created_at_unix)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, user_id, title, starts_at_unix, recurrence, now],
            )?;
            Ok(())
        })
        .await?;

        Ok(Event {
            id: id_out,
            user_id: user_id_out,
            title: title_out,
            starts_at_unix,
            recurrence: recurrence_out,
            last_expanded_unix: None,
        })
    }

    /// Recurring events whose next occurrence (from `starts_at_unix` or the last expansion,
    /// whichever is later) is at or before `now_unix` (spec §4.8 `expand_recurring_tasks`).
    pub async fn recurring_events_due_for_expansion(&self, now_unix: i64) -> Result<Vec<Event>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, starts_at_unix, recurrence, last_expanded_unix
                 FROM events
                 WHERE recurrence IS NOT NULL
                   AND COALESCE(last_expanded_unix, starts_at_unix) <= ?1",
            )?;
            let rows = stmt.query_map(params![now_unix], |row| {
                Ok(Event {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    starts_at_unix: row.get(3)?,
                    recurrence: row.get(4)?,
                    last_expanded_unix: row.get(5)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    pub async fn mark_event_expanded(&self, event_id: &str, expanded_to_unix: i64) -> Result<(), StoreError> {
        let event_id = event_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE events SET last_expanded_unix = ?1 WHERE id = ?2",
                params![expanded_to_unix, event_id],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn create_reminder(
        &self,
        user_id: &str,
        message: &str,
        fire_at_unix: i64,
    ) -> Result<Reminder, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let user_id = user_id.to_string();
        let message = message.to_string();
        let id_out = id.clone();
        let message_out = message.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO reminders (id, user_id, message, fire_at_unix, fired, created_at_unix)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![id, user_id, message, fire_at_unix, now],
            )?;
            Ok(())
        })
        .await?;

        Ok(Reminder {
            id: id_out,
            message: message_out,
            fire_at_unix,
            fired: false,
        })
    }

    /// Due (`fire_at_unix <= now`), unfired reminders (spec §4.8 `fire_reminders`).
    pub async fn due_reminders(&self, now_unix: i64) -> Result<Vec<Reminder>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, message, fire_at_unix, fired FROM reminders
                 WHERE fired = 0 AND fire_at_unix <= ?1",
            )?;
            let rows = stmt.query_map(params![now_unix], |row| {
                Ok(Reminder {
                    id: row.get(0)?,
                    message: row.get(1)?,
                    fire_at_unix: row.get(2)?,
                    fired: row.get::<_, i64>(3)? != 0,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    pub async fn mark_reminder_fired(&self, reminder_id: &str) -> Result<(), StoreError> {
        let reminder_id = reminder_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE reminders SET fired = 1 WHERE id = ?1",
                params![reminder_id],
            )?;
            Ok(())
        })
        .await
    }

    /// Deletes completed tasks and fired reminders older than `cutoff_unix` (spec §4.8
    /// `cleanup_old_data`: "archive completed items older than 90d").
    pub async fn delete_completed_older_than(&self, cutoff_unix: i64) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            let tasks_deleted = conn.execute(
                "DELETE FROM tasks WHERE completed = 1 AND created_at_unix < ?1",
                params![cutoff_unix],
            )?;
            let reminders_deleted = conn.execute(
                "DELETE FROM reminders WHERE fired = 1 AND fire_at_unix < ?1",
                params![cutoff_unix],
            )?;
            Ok((tasks_deleted + reminders_deleted) as u64)
        })
        .await
    }

    pub async fn record_job_run(&self, job_name: &str, status: &str) -> Result<(), StoreError> {
        let job_name = job_name.to_string();
        let status = status.to_string();
        let now = Utc::now().timestamp();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO scheduler_job_state (job_name, last_run_unix, last_status)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(job_name) DO UPDATE SET last_run_unix = excluded.last_run_unix, last_status = excluded.last_status",
                params![job_name, now, status],
            )?;
            Ok(())
        })
        .await
    }

    /// Last-run status for every job that has recorded at least one run, for `GET /health`
    /// (spec §2 "so GET /health can report it").
    pub async fn job_states(&self) -> Result<Vec<JobState>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT job_name, last_run_unix, last_status FROM scheduler_job_state ORDER BY job_name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(JobState {
                    job_name: row.get(0)?,
                    last_run_unix: row.get(1)?,
                    last_status: row.get(2)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    /// The content hash recorded the last time `file_path` was synced (spec §4.8 `vault_sync`
    /// "reconcile ... by content hash"), or `None` if never synced.
    pub async fn vault_known_hash(&self, file_path: &str) -> Result<Option<String>, StoreError> {
        let file_path = file_path.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT content_hash FROM vault_sync_state WHERE file_path = ?1",
                params![file_path],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                e => Err(e),
            })
        })
        .await
    }

    pub async fn vault_record_sync(&self, file_path: &str, content_hash: &str) -> Result<(), StoreError> {
        let file_path = file_path.to_string();
        let content_hash = content_hash.to_string();
        let now = Utc::now().timestamp();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO vault_sync_state (file_path, content_hash, synced_at_unix)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(file_path) DO UPDATE SET content_hash = excluded.content_hash, synced_at_unix = excluded.synced_at_unix",
                params![file_path, content_hash, now],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn health(&self) -> HealthStatus {
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

    fn tmp() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        (dir, path)
    }

    /// **Scenario**: logging food then nothing else round-trips the basics.
    #[tokio::test]
    async fn log_food_persists() {
        let (_dir, path) = tmp();
        let store = Datastore::new(&path).unwrap();
        let log = store.log_food("u1", "oatmeal", Some("breakfast")).await.unwrap();
        assert_eq!(log.item, "oatmeal");
    }

    /// **Scenario**: spec §8 scenario 3 — search_tasks finds a previously created task by title.
    #[tokio::test]
    async fn search_tasks_finds_created_task() {
        let (_dir, path) = tmp();
        let store = Datastore::new(&path).unwrap();
        store
            .create_task("u1", "write spec", None, "high")
            .await
            .unwrap();
        let found = store.search_tasks("u1", "write spec", 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "write spec");
    }

    /// **Scenario**: due_reminders only returns unfired reminders at or past fire_at_unix.
    #[tokio::test]
    async fn due_reminders_filters_fired_and_future() {
        let (_dir, path) = tmp();
        let store = Datastore::new(&path).unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO reminders (id, user_id, message, fire_at_unix, fired, created_at_unix)
                     VALUES ('r1', 'u1', 'past due', 100, 0, 100)",
                    [],
                )?;
                conn.execute(
                    "INSERT INTO reminders (id, user_id, message, fire_at_unix, fired, created_at_unix)
                     VALUES ('r2', 'u1', 'future', 999999999999, 0, 100)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        let due = store.due_reminders(1_000_000).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "r1");
    }

    /// **Scenario**: record_job_run upserts, and job_states reflects the latest status.
    #[tokio::test]
    async fn job_states_reflects_latest_recorded_run() {
        let (_dir, path) = tmp();
        let store = Datastore::new(&path).unwrap();
        assert!(store.job_states().await.unwrap().is_empty());

        store.record_job_run("vault_sync", "ok").await.unwrap();
        store.record_job_run("vault_sync", "degraded").await.unwrap();
        store.record_job_run("fire_reminders", "ok").await.unwrap();

        let states = store.job_states().await.unwrap();
        assert_eq!(states.len(), 2);
        let vault = states.iter().find(|s| s.job_name == "vault_sync").unwrap();
        assert_eq!(vault.last_status.as_deref(), Some("degraded"));
    }
}
