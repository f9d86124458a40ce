//! `ToolDescriptor` (spec §3.1): typed, namespaced tool metadata.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent_name::AgentName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    Read,
    Write,
}

/// Typed tool descriptor (spec §3.1, §4.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema for arguments; validated before invocation (spec §4.2).
    pub parameter_schema: Value,
    pub side_effects: SideEffect,
    /// Agents allowed to call this tool. Tools are not shared across agents unless listed
    /// here (spec §3.1).
    pub owning_agents: HashSet<AgentName>,
    /// Whether the registry may retry this tool on transient failure (spec §4.2: "Handlers
    /// MUST be idempotent to retry only if their descriptor declares so").
    pub idempotent: bool,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_schema: Value,
        side_effects: SideEffect,
        owning_agents: impl IntoIterator<Item = AgentName>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema,
            side_effects,
            owning_agents: owning_agents.into_iter().collect(),
            idempotent: false,
        }
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }

    pub fn owned_by(&self, agent: AgentName) -> bool {
        self.owning_agents.contains(&agent)
    }
}
