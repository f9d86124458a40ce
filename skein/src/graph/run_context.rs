//! `RunContext`: everything the graph needs to run one turn, gathered once at startup and
//! shared (read-only) across concurrent turns — mirrors `loom::graph::runtime::Runtime`'s role
//! of bundling the capability handles a compiled graph closes over.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{AgentLoopConfig, AgentSpec};
use crate::agent_name::AgentName;
use crate::llm::LlmCapability;
use crate::routing::RouterConfig;
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub struct RunContext {
    pub llm: Arc<dyn LlmCapability>,
    pub registry: Arc<ToolRegistry>,
    pub specs: Arc<HashMap<AgentName, AgentSpec>>,
    pub router_config: RouterConfig,
    pub agent_loop_config: AgentLoopConfig,
    pub tool_deadline: Duration,
    pub max_handoffs: usize,
    pub state_max_messages: usize,
}

impl RunContext {
    pub fn spec_for(&self, agent: AgentName) -> Option<&AgentSpec> {
        self.specs.get(&agent)
    }
}
