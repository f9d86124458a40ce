//! Scheduler (spec §4.8): a lightweight in-process scheduler running parallel to the turn
//! handler — named jobs, each on its own interval, no overlap per job name, independent
//! failure.
//!
//! Grounded on `loom::model_spec::refresher::ResolverRefresher`'s `tokio::time::interval` +
//! `MissedTickBehavior::Skip` loop, generalized from one hardcoded refresh to a registry of
//! named jobs with independent cadences, per-run deadlines, and graceful shutdown.

pub mod job;
pub mod jobs;

pub use job::{Job, JobError, JobSpec};

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns every spawned job loop; dropping it leaves the jobs running (use [`Scheduler::shutdown`]
/// to stop them deliberately).
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawns `job` on its own tick loop per `spec`. A disabled spec (config `*_ENABLED =
    /// false`) is logged and not scheduled at all (spec §6.3 per-job enable flags).
    pub fn spawn(&mut self, spec: JobSpec, job: std::sync::Arc<dyn Job>) {
        if !spec.enabled {
            info!(job = spec.name, "job disabled, not scheduling");
            return;
        }

        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(spec.interval);
            // A run that overruns its own interval causes the next tick(s) to be skipped
            // rather than queued — this is how "if a previous run is still active, the next
            // tick for the same job is skipped" (spec §4.8) falls out of a plain sequential
            // loop instead of needing an explicit overlap guard.
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(job = spec.name, "job loop stopped");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                info!(job = spec.name, "job run starting");
                match tokio::time::timeout(spec.timeout, job.run()).await {
                    Ok(Ok(())) => info!(job = spec.name, "job run finished"),
                    Ok(Err(e)) => warn!(job = spec.name, error = %e, "job run failed"),
                    Err(_) => warn!(job = spec.name, "job run exceeded its deadline"),
                }
            }
        });
        self.handles.push(handle);
    }

    /// Signals every job loop to stop and waits up to `grace_period` for them to exit (spec
    /// §4.8 "Cancellation": "stop within a bounded grace period (default 10 s)").
    pub async fn shutdown(self, grace_period: Duration) {
        self.cancel.cancel();
        let joined = tokio::time::timeout(grace_period, futures::future::join_all(self.handles)).await;
        if joined.is_err() {
            warn!("scheduler shutdown grace period elapsed with jobs still running");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
