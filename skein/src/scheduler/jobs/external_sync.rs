//! `external_sync` (spec §4.8, optional): two-way reconcile tasks/events with an external
//! service. The external service's API is explicitly out of scope (spec.md Non-goals: "external
//! API clients"); this job defines the reconciliation shape against an injected client trait so
//! a host can plug a real integration in without touching the scheduler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::scheduler::job::{Job, JobError};
use crate::store::Datastore;

/// One item as seen by the external service, keyed the same way local items are.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalItem {
    pub external_id: String,
    pub title: String,
    pub changed: bool,
}

/// The external side of a two-way sync. `fetch_changes` lists items the external service has
/// touched since the last sync; `push_local` reports local-only items outward.
#[async_trait]
pub trait ExternalSyncClient: Send + Sync {
    async fn fetch_changes(&self) -> Result<Vec<ExternalItem>, JobError>;
    async fn push_local(&self, items: &[crate::store::Task]) -> Result<(), JobError>;
}

/// No-op client used when no external integration is configured; `external_sync` degrades to a
/// harmless tick rather than requiring the job to be disabled outright.
pub struct NoopExternalSyncClient;

#[async_trait]
impl ExternalSyncClient for NoopExternalSyncClient {
    async fn fetch_changes(&self) -> Result<Vec<ExternalItem>, JobError> {
        Ok(Vec::new())
    }

    async fn push_local(&self, _items: &[crate::store::Task]) -> Result<(), JobError> {
        Ok(())
    }
}

pub struct ExternalSyncJob {
    store: Arc<Datastore>,
    client: Arc<dyn ExternalSyncClient>,
}

impl ExternalSyncJob {
    pub fn new(store: Arc<Datastore>, client: Arc<dyn ExternalSyncClient>) -> Self {
        Self { store, client }
    }
}

#[async_trait]
impl Job for ExternalSyncJob {
    fn name(&self) -> &'static str {
        "external_sync"
    }

    async fn run(&self) -> Result<(), JobError> {
        // Conflict policy (spec §4.8): external wins on a changed field, local wins on a
        // brand-new item. Changed external items are materialized as tasks unconditionally;
        // new local items are discovered via search and pushed outward.
        let changes = self.client.fetch_changes().await?;
        for item in changes.into_iter().filter(|i| i.changed) {
            self.store
                .create_task("external", &item.title, None, "normal")
                .await
                .map_err(|e| JobError::new(e.to_string()))?;
        }

        let local_open = self
            .store
            .search_tasks("external", "", 100)
            .await
            .map_err(|e| JobError::new(e.to_string()))?;
        self.client.push_local(&local_open).await?;

        self.store
            .record_job_run(self.name(), "ok")
            .await
            .map_err(|e| JobError::new(e.to_string()))?;
        Ok(())
    }
}
