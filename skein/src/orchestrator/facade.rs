//! Orchestrator Facade (spec §4.7): the core's sole per-turn entry point — load → validate →
//! append → run → save → return.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashSet;
use tracing::warn;

use crate::checkpoint::{CheckpointError, Checkpointer};
use crate::graph::CompiledGraph;
use crate::message::Message;
use crate::orchestrator::error::OrchestratorError;
use crate::state::SessionState;

/// The caller-facing request/response shapes (spec §4.7, §6.1) — transport-agnostic; an HTTP
/// layer maps these to/from JSON.
#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub session_id: String,
    pub user_id: String,
    pub workspace: String,
    pub user_message: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatTurnReply {
    pub reply: String,
    pub agent: Option<String>,
    pub session_id: String,
    pub turn_count: u64,
    pub timestamp: chrono::DateTime<Utc>,
}

pub struct OrchestratorConfig {
    pub checkpoint_ttl_seconds: u64,
    pub turn_budget: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            checkpoint_ttl_seconds: 86_400,
            turn_budget: Duration::from_secs(60),
        }
    }
}

/// The per-turn entry point (spec §4.7). Not idempotent: re-submitting the same user message
/// appends another turn (spec: "Deduplication is not in scope for the core").
pub struct Orchestrator {
    checkpointer: Arc<dyn Checkpointer>,
    graph: CompiledGraph,
    config: OrchestratorConfig,
    /// Best-effort advisory lock on `session_id` (spec §5 "Shared-resource policy": "two
    /// concurrent requests for the same session_id are a client error").
    in_flight: DashSet<String>,
}

impl Orchestrator {
    pub fn new(checkpointer: Arc<dyn Checkpointer>, graph: CompiledGraph, config: OrchestratorConfig) -> Self {
        Self {
            checkpointer,
            graph,
            config,
            in_flight: DashSet::new(),
        }
    }

    pub async fn handle_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnReply, OrchestratorError> {
        validate(&request)?;
        self.acquire_session_lock(&request.session_id)?;
        let result = self.run_locked(request.clone()).await;
        self.release_session_lock(&request.session_id);
        result
    }

    fn acquire_session_lock(&self, session_id: &str) -> Result<(), OrchestratorError> {
        if !self.in_flight.insert(session_id.to_string()) {
            return Err(OrchestratorError::ConcurrentTurn);
        }
        Ok(())
    }

    fn release_session_lock(&self, session_id: &str) {
        self.in_flight.remove(session_id);
    }

    async fn run_locked(&self, request: ChatTurnRequest) -> Result<ChatTurnReply, OrchestratorError> {
        // Step 1: load or start fresh. A Corrupt checkpoint starts fresh with a warning
        // (spec §7); Unavailable surfaces to the caller.
        let mut state = match self.checkpointer.load(&request.session_id).await {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::new(&request.session_id, &request.user_id, &request.workspace),
            Err(CheckpointError::Corrupt(reason)) => {
                warn!(session_id = %request.session_id, reason, "checkpoint corrupt; starting fresh");
                SessionState::new(&request.session_id, &request.user_id, &request.workspace)
            }
            Err(e) => return Err(e.into()),
        };

        // Step 2: append the user message, bump turn_count.
        state.messages.push(Message::user(request.user_message.clone()));
        state.turn_count += 1;
        state.updated_at = Utc::now();

        // Step 3: run the graph to termination, bounded by the per-turn wall-clock budget.
        let deadline = Instant::now() + self.config.turn_budget;
        self.graph.run_turn(&mut state, Some(deadline)).await;

        // Step 4: extract the reply.
        let reply = state
            .last_assistant_message()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "I don't have a reply for that.".to_string());

        // Step 5: save; a save failure is logged but does not fail the turn (at-least-once
        // reply semantics — spec §4.7 step 5).
        if let Err(e) = self
            .checkpointer
            .save(&request.session_id, &state, self.config.checkpoint_ttl_seconds)
            .await
        {
            warn!(session_id = %request.session_id, error = %e, "checkpoint save failed; reply still returned");
        }

        Ok(ChatTurnReply {
            reply,
            agent: state.current_agent.map(|a| a.to_string()),
            session_id: request.session_id,
            turn_count: state.turn_count,
            timestamp: state.updated_at,
        })
    }
}

fn validate(request: &ChatTurnRequest) -> Result<(), OrchestratorError> {
    if request.session_id.trim().is_empty() {
        return Err(OrchestratorError::Validation("session_id must not be empty".into()));
    }
    if request.user_id.trim().is_empty() {
        return Err(OrchestratorError::Validation("user_id must not be empty".into()));
    }
    if request.workspace.trim().is_empty() {
        return Err(OrchestratorError::Validation("workspace must not be empty".into()));
    }
    if request.user_message.trim().is_empty() {
        return Err(OrchestratorError::Validation("message must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{default_specs, AgentLoopConfig, AgentSpec};
    use crate::agent_name::AgentName;
    use crate::checkpoint::MemorySaver;
    use crate::graph::RunContext;
    use crate::llm::MockLlm;
    use crate::routing::RouterConfig;
    use crate::tools::ToolRegistry;
    use std::collections::HashMap;
    use std::time::Duration;

    fn orchestrator(llm: Arc<dyn crate::llm::LlmCapability>) -> Orchestrator {
        let specs: HashMap<AgentName, AgentSpec> = default_specs().into_iter().map(|s| (s.name, s)).collect();
        let run_context = RunContext {
            llm,
            registry: Arc::new(ToolRegistry::new()),
            specs: Arc::new(specs),
            router_config: RouterConfig {
                confidence_floor: 0.3,
                default_agent: AgentName::Food,
                routing_temperature: 0.1,
                llm_deadline: Duration::from_secs(5),
            },
            agent_loop_config: AgentLoopConfig::default(),
            tool_deadline: Duration::from_secs(5),
            max_handoffs: 3,
            state_max_messages: 20,
        };
        Orchestrator::new(
            Arc::new(MemorySaver::new()),
            CompiledGraph::new(run_context),
            OrchestratorConfig::default(),
        )
    }

    fn request(session_id: &str, message: &str) -> ChatTurnRequest {
        ChatTurnRequest {
            session_id: session_id.into(),
            user_id: "u1".into(),
            workspace: "ws1".into(),
            user_message: message.into(),
        }
    }

    /// **Scenario**: an empty message is rejected before touching the checkpointer.
    #[tokio::test]
    async fn empty_message_is_validation_error() {
        let orchestrator = orchestrator(Arc::new(MockLlm::fixed("hi")));
        let err = orchestrator.handle_turn(request("s1", "   ")).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Validation(_)));
    }

    /// **Scenario**: spec §8 scenario 1 — a fresh session turn increments turn_count to 1.
    #[tokio::test]
    async fn fresh_session_turn_increments_turn_count() {
        let orchestrator = orchestrator(Arc::new(MockLlm::fixed("Logged!")));
        let reply = orchestrator
            .handle_turn(request("s1", "Log that I ate oatmeal for breakfast."))
            .await
            .unwrap();
        assert_eq!(reply.turn_count, 1);
        assert_eq!(reply.agent.as_deref(), Some("food"));
    }

    /// **Scenario**: spec §8 scenario 3 — a second turn on the same session sees turn_count 2
    /// and the checkpointed state from turn 1.
    #[tokio::test]
    async fn second_turn_on_same_session_increments_again() {
        let orchestrator = orchestrator(Arc::new(MockLlm::fixed("ok")));
        orchestrator
            .handle_turn(request("s3", "Create a task 'write spec' due Friday, priority high."))
            .await
            .unwrap();
        let reply = orchestrator
            .handle_turn(request("s3", "What was the task I just created?"))
            .await
            .unwrap();
        assert_eq!(reply.turn_count, 2);
    }
}
