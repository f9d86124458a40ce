//! `fire_reminders` (spec §4.8): find due, unfired reminders, mark them fired, emit a
//! notification per reminder via a sink.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::scheduler::job::{Job, JobError};
use crate::store::Datastore;

/// Where a fired reminder's notification goes. The spec leaves the transport unspecified
/// ("emit notifications via a sink"); `LogSink` is the only implementation this crate ships,
/// matching the Non-goal that external notification transports are out of scope.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, reminder_id: &str, message: &str);
}

pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, reminder_id: &str, message: &str) {
        info!(reminder_id, message, "reminder fired");
    }
}

pub struct FireRemindersJob {
    store: Arc<Datastore>,
    sink: Arc<dyn NotificationSink>,
}

impl FireRemindersJob {
    pub fn new(store: Arc<Datastore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl Job for FireRemindersJob {
    fn name(&self) -> &'static str {
        "fire_reminders"
    }

    async fn run(&self) -> Result<(), JobError> {
        let now = Utc::now().timestamp();
        let due = self
            .store
            .due_reminders(now)
            .await
            .map_err(|e| JobError::new(e.to_string()))?;

        for reminder in &due {
            self.sink.notify(&reminder.id, &reminder.message);
            self.store
                .mark_reminder_fired(&reminder.id)
                .await
                .map_err(|e| JobError::new(e.to_string()))?;
        }

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
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink(AtomicUsize);

    impl NotificationSink for CountingSink {
        fn notify(&self, _reminder_id: &str, _message: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// **Scenario**: a due reminder is fired, marked, and notified exactly once; a future
    /// reminder is left untouched.
    #[tokio::test]
    async fn due_reminder_is_fired_and_notified() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(dir.path().join("s.db")).unwrap());
        store.create_reminder("u1", "drink water", 1).await.unwrap();
        store
            .create_reminder("u1", "far future", Utc::now().timestamp() + 86_400)
            .await
            .unwrap();

        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let job = FireRemindersJob::new(Arc::clone(&store), sink.clone());
        job.run().await.unwrap();

        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
        let due = store.due_reminders(Utc::now().timestamp()).await.unwrap();
        assert_eq!(due.len(), 0, "fired reminder must not be returned as due again");
    }
}
