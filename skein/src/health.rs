//! Shared health-status vocabulary (spec §6.1 `GET /health`), used by the Checkpointer,
//! Datastore, and Scheduler's `health_probe` job.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Degraded,
    Unavailable,
}

impl HealthStatus {
    /// Worst-of merge: Unavailable dominates Degraded dominates Ok.
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        use HealthStatus::*;
        match (self, other) {
            (Unavailable, _) | (_, Unavailable) => Unavailable,
            (Degraded, _) | (_, Degraded) => Degraded,
            (Ok, Ok) => Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: worst() is commutative and Unavailable always wins.
    #[test]
    fn worst_prefers_unavailable_over_degraded_over_ok() {
        assert_eq!(HealthStatus::Ok.worst(HealthStatus::Degraded), HealthStatus::Degraded);
        assert_eq!(
            HealthStatus::Degraded.worst(HealthStatus::Unavailable),
            HealthStatus::Unavailable
        );
        assert_eq!(HealthStatus::Ok.worst(HealthStatus::Ok), HealthStatus::Ok);
    }
}
