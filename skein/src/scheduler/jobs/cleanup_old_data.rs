//! `cleanup_old_data` (spec §4.8): archive completed items older than 90 days.
//!
//! Spec.md's "decay memory salience" half of this job's responsibility applies to the memory
//! agent's salience store, which this build does not register (see DESIGN.md); only the
//! datastore-archival half applies here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tracing::info;

use crate::scheduler::job::{Job, JobError};
use crate::store::Datastore;

pub const RETENTION_DAYS: i64 = 90;

pub struct CleanupOldDataJob {
    store: Arc<Datastore>,
}

impl CleanupOldDataJob {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Job for CleanupOldDataJob {
    fn name(&self) -> &'static str {
        "cleanup_old_data"
    }

    async fn run(&self) -> Result<(), JobError> {
        let cutoff = Utc::now() - ChronoDuration::days(RETENTION_DAYS);
        let deleted = self
            .store
            .delete_completed_older_than(cutoff.timestamp())
            .await
            .map_err(|e| JobError::new(e.to_string()))?;
        info!(deleted, "cleaned up old data");

        self.store
            .record_job_run(self.name(), "ok")
            .await
            .map_err(|e| JobError::new(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a recently created, incomplete task survives a cleanup run (only old,
    /// completed items are in scope — exercised fully at the store layer).
    #[tokio::test]
    async fn cleanup_run_leaves_recent_task_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(dir.path().join("s.db")).unwrap());
        store.create_task("u1", "still open", None, "normal").await.unwrap();

        let job = CleanupOldDataJob::new(Arc::clone(&store));
        job.run().await.unwrap();

        let found = store.search_tasks("u1", "still open", 10).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
