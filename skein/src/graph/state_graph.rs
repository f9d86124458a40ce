//! `CompiledGraph`: runs one turn to termination (spec §4.6).
//!
//! The teacher's `StateGraph<S>` is a general node/edge compiler with cycle detection that is
//! explicitly skipped once conditional edges are present (`compile_internal`'s linear-chain-only
//! check) — exactly the Router↔Agent↔Continue? loop this spec needs. Rather than port that
//! general compiler (and `conditional.rs`/`retry.rs`/`interrupt.rs`, absent from the retrieved
//! pack), this module hand-writes the one topology the spec actually names: `START → prune →
//! Router → Agent(current) → Continue?`, bounded by `MAX_HANDOFFS`. See DESIGN.md.

use tracing::{info, warn};

use crate::agent::run_agent_turn;
use crate::graph::node::Next;
use crate::graph::run_context::RunContext;
use crate::message::Message;
use crate::routing::{route, RoutingSource};
use crate::state::{prune, SessionState};
use crate::tools::ToolCtx;

/// Per-turn router revisit cap (spec §6.3 `MAX_HANDOFFS`, default 3).
pub const DEFAULT_MAX_HANDOFFS: usize = 3;

pub struct CompiledGraph {
    pub run_context: RunContext,
}

impl CompiledGraph {
    pub fn new(run_context: RunContext) -> Self {
        Self { run_context }
    }

    /// Runs `START → prune → Router → Agent(current) → Continue?` to termination, mutating
    /// `state` in place (spec §4.6). Always terminates (spec §4.6 "Termination invariant").
    ///
    /// `turn_deadline`, when set, is checked between hops so a turn that overruns its
    /// wall-clock budget halts at a suspension point and still persists whatever it produced
    /// (spec §5 "Cancellation and timeouts"), rather than the Orchestrator dropping an
    /// in-flight future and losing partial progress.
    pub async fn run_turn(&self, state: &mut SessionState, turn_deadline: Option<std::time::Instant>) {
        prune(&mut state.messages, self.run_context.state_max_messages);

        for hop in 1..=self.run_context.max_handoffs {
            if let Some(deadline) = turn_deadline {
                if std::time::Instant::now() >= deadline {
                    warn!("turn wall-clock budget exceeded");
                    state.push_trace("TurnTimeout");
                    state
                        .messages
                        .push(Message::assistant("request timed out", "system"));
                    state.target_agent = None;
                    state.handoff_reason = None;
                    return;
                }
            }

            let decision = route(state, self.run_context.llm.as_ref(), &self.run_context.router_config).await;

            let Some(spec) = self.run_context.spec_for(decision.agent) else {
                warn!(agent = %decision.agent, "router named an agent with no registered spec");
                state.push_trace(format!("RouterAnomaly: no spec registered for {}", decision.agent));
                break;
            };

            let tool_ctx = ToolCtx::new(
                state.user_id.clone(),
                state.session_id.clone(),
                state.workspace.clone(),
                self.run_context.tool_deadline,
            );

            let outcome = run_agent_turn(
                spec,
                state,
                self.run_context.llm.as_ref(),
                self.run_context.registry.as_ref(),
                &tool_ctx,
                &self.run_context.agent_loop_config,
            )
            .await;

            state.messages.extend(outcome.new_messages);
            for entry in outcome.trace_entries {
                state.push_trace(entry);
            }

            state.previous_agent = state.current_agent;
            state.current_agent = Some(decision.agent);
            // The explicit target (if this hop served one) has now been consumed.
            if decision.source == RoutingSource::Explicit {
                state.target_agent = None;
            }

            if !outcome.context_entries.is_empty() {
                state
                    .agent_contexts
                    .entry(decision.agent)
                    .or_default()
                    .replace(outcome.context_entries);
            }

            let next = if outcome.handoff.should_handoff {
                state.target_agent = outcome.handoff.target_agent;
                state.handoff_reason = outcome.handoff.reason.clone();
                Next::Router
            } else {
                state.target_agent = None;
                state.handoff_reason = None;
                Next::End
            };

            info!(agent = %decision.agent, hop, next = ?next, "graph hop complete");

            if next == Next::End {
                return;
            }
            if hop == self.run_context.max_handoffs {
                // The bound would be exceeded on the next hop (spec §4.6 "Handoff loop bound").
                warn!(hops = hop, "handoff loop bound exceeded");
                state.push_trace("HandoffLoopExceeded");
                state.messages.push(Message::assistant(
                    "I wasn't able to resolve your request across agents",
                    decision.agent.as_str(),
                ));
                state.target_agent = None;
                state.handoff_reason = None;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{default_specs, AgentLoopConfig};
    use crate::agent_name::AgentName;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::message::{Message as Msg, ToolCallRequest};
    use crate::routing::RouterConfig;
    use crate::tools::builtin;
    use crate::tools::ToolRegistry;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn run_context(llm: Arc<dyn crate::llm::LlmCapability>, registry: ToolRegistry) -> RunContext {
        let specs: HashMap<AgentName, crate::agent::AgentSpec> =
            default_specs().into_iter().map(|s| (s.name, s)).collect();
        RunContext {
            llm,
            registry: Arc::new(registry),
            specs: Arc::new(specs),
            router_config: RouterConfig {
                confidence_floor: 0.3,
                default_agent: AgentName::Food,
                routing_temperature: 0.1,
                llm_deadline: Duration::from_secs(5),
            },
            agent_loop_config: AgentLoopConfig::default(),
            tool_deadline: Duration::from_secs(5),
            max_handoffs: DEFAULT_MAX_HANDOFFS,
            state_max_messages: crate::state::DEFAULT_STATE_MAX_MESSAGES,
        }
    }

    /// **Scenario**: spec §8 scenario 1 — a trivial food turn ends with current_agent=food and
    /// one new assistant message, without looping.
    #[tokio::test]
    async fn trivial_food_turn_terminates_with_food_agent() {
        let mut registry = ToolRegistry::new();
        let store = Arc::new(crate::store::Datastore::new(tempfile::NamedTempFile::new().unwrap().path()).unwrap());
        builtin::register_all(&mut registry, store);

        let llm = Arc::new(MockLlm::fixed("Logged your oatmeal!"));
        let graph = CompiledGraph::new(run_context(llm, registry));

        let mut state = SessionState::new("s1", "u1", "ws1");
        state.messages.push(Msg::user("Log that I ate oatmeal for breakfast."));

        graph.run_turn(&mut state, None).await;

        assert_eq!(state.current_agent, Some(AgentName::Food));
        assert!(state.messages.last().unwrap().content.contains("Logged"));
        assert!(state.target_agent.is_none());
    }

    /// **Scenario**: spec §8 scenario 2 — a handoff re-enters the Router and lands on the
    /// target agent, with previous_agent recording where it came from.
    #[tokio::test]
    async fn handoff_reroutes_to_target_agent() {
        let mut registry = ToolRegistry::new();
        registry.register(builtin::handoff::descriptor(), Arc::new(builtin::handoff::RequestHandoffTool));

        // First hop (food): calls request_handoff. Second hop (task): plain reply.
        let llm = Arc::new(MockLlm::from_responses(vec![
            LlmResponse {
                content: "".into(),
                tool_calls: vec![ToolCallRequest {
                    id: "call-1".into(),
                    name: "request_handoff".into(),
                    arguments: r#"{"target":"task","reason":"user wants a task"}"#.into(),
                }],
                usage: None,
            },
            LlmResponse {
                content: "Added the task!".into(),
                tool_calls: vec![],
                usage: None,
            },
        ]));

        let graph = CompiledGraph::new(run_context(llm, registry));

        let mut state = SessionState::new("s2", "u1", "ws1");
        state.current_agent = Some(AgentName::Food);
        state
            .messages
            .push(Msg::user("Now add a task to buy oatmeal tomorrow."));

        graph.run_turn(&mut state, None).await;

        assert_eq!(state.current_agent, Some(AgentName::Task));
        assert_eq!(state.previous_agent, Some(AgentName::Food));
        assert!(state.target_agent.is_none());
    }

    /// **Scenario**: spec §4.6 "Handoff loop bound" — a tool that always requests a handoff to
    /// itself exceeds MAX_HANDOFFS and terminates with an apology rather than looping forever.
    #[tokio::test]
    async fn exceeding_handoff_bound_terminates_with_apology() {
        let mut registry = ToolRegistry::new();
        registry.register(builtin::handoff::descriptor(), Arc::new(builtin::handoff::RequestHandoffTool));

        let always_handoff = LlmResponse {
            content: "".into(),
            tool_calls: vec![ToolCallRequest {
                id: "call-1".into(),
                name: "request_handoff".into(),
                arguments: r#"{"target":"event","reason":"looping"}"#.into(),
            }],
            usage: None,
        };
        let llm = Arc::new(MockLlm::from_responses(vec![always_handoff]));
        let mut context = run_context(llm, registry);
        context.max_handoffs = 2;
        let graph = CompiledGraph::new(context);

        let mut state = SessionState::new("s3", "u1", "ws1");
        state.messages.push(Msg::user("Schedule something."));

        graph.run_turn(&mut state, None).await;

        assert!(state
            .messages
            .last()
            .unwrap()
            .content
            .contains("wasn't able to resolve"));
        assert!(state.target_agent.is_none());
    }
}
