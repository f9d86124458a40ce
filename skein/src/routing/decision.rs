//! `RoutingDecision` (spec §3.1).

use serde::{Deserialize, Serialize};

use crate::agent_name::AgentName;

/// Where a routing decision came from, for logging and the §8 determinism property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingSource {
    Keyword,
    Llm,
    Explicit,
}

/// Output of the Router (spec §3.1, §4.4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: AgentName,
    pub confidence: f32,
    pub reason: String,
    pub source: RoutingSource,
}

impl RoutingDecision {
    pub fn explicit(agent: AgentName) -> Self {
        Self {
            agent,
            confidence: 1.0,
            reason: "explicit handoff target".into(),
            source: RoutingSource::Explicit,
        }
    }
}
