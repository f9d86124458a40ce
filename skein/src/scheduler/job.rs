//! `Job`: the scheduler's unit of work (spec §4.8): name, trigger cadence, handler, a per-run
//! timeout, and an enable flag.
//!
//! Grounded on `loom::model_spec::refresher::ResolverRefresher` (a named background task ticking
//! on a `tokio::time::interval`), generalized from one hardcoded refresh loop to a registry of
//! named jobs with independent cadences and a per-run deadline.

use std::time::Duration;

use async_trait::async_trait;

/// One scheduler job's behavior. Implementations hold whatever `Arc<...>` handles they need
/// (datastore, registry) and must not block the executor thread.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<(), JobError>;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct JobError(pub String);

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Static configuration for one registered job (spec §4.8 "trigger ... per-run timeout ...
/// enabled flag").
pub struct JobSpec {
    pub name: &'static str,
    pub interval: Duration,
    pub timeout: Duration,
    pub enabled: bool,
}
