//! The reason/act loop (spec §4.5): compose input → `llm.complete` → execute tool calls →
//! repeat until a tool-call-free reply or the loop budget is exhausted.
//!
//! Grounded on the shape of `loom::agent::react`'s think/act/observe cycle, collapsed into one
//! function since this core's Graph Runtime (`graph::CompiledGraph`) treats the whole loop as
//! a single `Agent(a)` node rather than its own sub-graph (see DESIGN.md).

use std::time::Duration;

use tracing::warn;

use crate::agent::context_injection::compose_context_message;
use crate::agent::handoff::{self, HandoffDecision};
use crate::agent::spec::AgentSpec;
use crate::llm::{CompleteOptions, LlmCapability, LlmError};
use crate::message::Message;
use crate::state::SessionState;
use crate::tools::{ToolCtx, ToolError, ToolRegistry, ToolResult};

/// Hard cap on reason/act rounds within one turn (spec §6.3 `MAX_TOOL_ROUNDS`, default 6).
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 6;

#[derive(Clone, Debug)]
pub struct AgentLoopConfig {
    pub max_tool_rounds: usize,
    pub tool_deadline: Duration,
    pub llm_deadline: Duration,
    pub agent_temperature: f32,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_deadline: Duration::from_secs(15),
            llm_deadline: Duration::from_secs(30),
            agent_temperature: 0.7,
        }
    }
}

/// What one agent turn produced, handed back to the Graph Runtime for application to
/// `SessionState` (spec §4.5 step 6).
#[derive(Debug)]
pub struct AgentTurnOutcome {
    /// New assistant/tool messages to append, in order.
    pub new_messages: Vec<Message>,
    pub handoff: HandoffDecision,
    /// Bounded context entries to write via `AgentContext::replace` (spec §4.5 step 6).
    pub context_entries: Vec<(String, String)>,
    pub trace_entries: Vec<String>,
}

/// Runs one agent turn per spec §4.5. Never returns an `Err`: all absorbed failures are
/// recorded in `trace_entries` and surfaced as a best-effort assistant message instead.
pub async fn run_agent_turn(
    spec: &AgentSpec,
    state: &SessionState,
    llm: &dyn LlmCapability,
    registry: &ToolRegistry,
    ctx: &ToolCtx,
    config: &AgentLoopConfig,
) -> AgentTurnOutcome {
    let mut trace_entries = Vec::new();

    // Step 1: compose input messages.
    let context_message = compose_context_message(spec, state);
    let mut working: Vec<Message> = vec![context_message];
    working.extend(state.messages.iter().cloned());

    let tools: Vec<_> = registry
        .tools_for(spec.name)
        .into_iter()
        .filter(|d| spec.allowed_tools.iter().any(|allowed| allowed == &d.name))
        .collect();
    let tools_ref = if tools.is_empty() { None } else { Some(tools.as_slice()) };

    let options = CompleteOptions {
        temperature: spec.temperature_override.unwrap_or(config.agent_temperature),
        response_schema: None,
        deadline: config.llm_deadline,
    };

    let mut new_messages: Vec<Message> = Vec::new();
    let mut overflow_retried = false;
    let mut round = 0usize;

    loop {
        let response = match llm.complete(&working, tools_ref, &options).await {
            Ok(r) => r,
            Err(LlmError::ContextOverflow) if !overflow_retried => {
                overflow_retried = true;
                trace_entries.push("LlmError::ContextOverflow: emergency pruning and retry".into());
                emergency_prune(&mut working);
                continue;
            }
            Err(LlmError::ContextOverflow) => {
                trace_entries.push("LlmError::ContextOverflow: second occurrence, aborting turn".into());
                new_messages.push(Message::assistant(
                    "I'm sorry, this conversation has grown too large for me to process right now.",
                    spec.name.as_str(),
                ));
                return AgentTurnOutcome {
                    new_messages,
                    handoff: HandoffDecision::none(),
                    context_entries: Vec::new(),
                    trace_entries,
                };
            }
            Err(e) => {
                warn!(error = %e, agent = %spec.name, "llm call failed mid-turn");
                trace_entries.push(format!("LlmError::{}: {e}", e.kind_name()));
                new_messages.push(Message::assistant(
                    "I ran into a problem and couldn't complete that just now.",
                    spec.name.as_str(),
                ));
                return AgentTurnOutcome {
                    new_messages,
                    handoff: HandoffDecision::none(),
                    context_entries: Vec::new(),
                    trace_entries,
                };
            }
        };

        if response.tool_calls.is_empty() {
            let assistant_msg = Message::assistant(response.content, spec.name.as_str());
            working.push(assistant_msg.clone());
            new_messages.push(assistant_msg);
            break;
        }

        round += 1;
        if round > config.max_tool_rounds {
            trace_entries.push("AgentError::StepLimitExceeded".into());
            let assistant_msg = Message::assistant(
                "I wasn't able to finish that after several attempts — let me know if you'd like to try a simpler request.",
                spec.name.as_str(),
            );
            working.push(assistant_msg.clone());
            new_messages.push(assistant_msg);
            break;
        }

        let assistant_msg = Message::assistant_with_tool_calls(
            response.content.clone(),
            spec.name.as_str(),
            response.tool_calls.clone(),
        );
        working.push(assistant_msg.clone());
        new_messages.push(assistant_msg);

        for call in &response.tool_calls {
            let result = if spec.allowed_tools.iter().any(|allowed| allowed == &call.name) {
                registry.invoke(&call.name, &call.arguments, ctx).await
            } else {
                ToolResult::err(ToolError::invalid_argument(format!(
                    "{} is not in {}'s allowed tool list",
                    call.name,
                    spec.name
                )))
            };
            trace_entries.push(format!("tool call: {}", call.name));
            let tool_msg = Message::tool(result.to_message_content(), spec.name.as_str(), call.id.clone());
            working.push(tool_msg.clone());
            new_messages.push(tool_msg);
        }
    }

    // Step 5: handoff detection — explicit tool call wins, else ask the LLM.
    let last_tool_calls = new_messages
        .iter()
        .rev()
        .find(|m| m.is_tool_call_group_start())
        .map(|m| m.tool_calls.clone())
        .unwrap_or_default();

    let handoff = match handoff::detect_explicit(&last_tool_calls) {
        Some(decision) => decision,
        None => {
            let last_user = state
                .messages
                .iter()
                .rev()
                .find(|m| m.role == crate::message::Role::User)
                .map(|m| m.content.as_str())
                .unwrap_or("");
            let agent_reply = new_messages
                .iter()
                .rev()
                .find(|m| m.role == crate::message::Role::Assistant && m.tool_calls.is_empty())
                .map(|m| m.content.as_str())
                .unwrap_or("");
            handoff::detect_implicit(last_user, agent_reply, spec.name, llm, config.llm_deadline).await
        }
    };

    // Step 6 (context update): record the most recent tool call as this turn's memory of what
    // the agent did, replacing prior context wholesale (spec §4.5 step 6 "replace, not append").
    let context_entries = new_messages
        .iter()
        .rev()
        .find(|m| m.role == crate::message::Role::Tool)
        .and_then(|m| m.tool_call_id.clone())
        .map(|id| vec![("last_tool_call_id".to_string(), id)])
        .unwrap_or_default();

    AgentTurnOutcome {
        new_messages,
        handoff,
        context_entries,
        trace_entries,
    }
}

/// Emergency pruning pass (spec §4.5 "Failure semantics"): drop half the oldest non-anchor
/// messages from the working list (distinct from `state::pruning::prune`, which runs once per
/// turn before the Router — this is a mid-turn rescue, not the steady-state policy).
fn emergency_prune(working: &mut Vec<Message>) {
    if working.len() <= 2 {
        return;
    }
    let drop_count = (working.len() - 1) / 2;
    working.drain(1..1 + drop_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_name::AgentName;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::message::ToolCallRequest;
    use crate::tools::builtin;
    use crate::tools::descriptor::{SideEffect, ToolDescriptor};
    use crate::tools::registry::ToolHandler;
    use crate::tools::result::ToolError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn ctx() -> ToolCtx {
        ToolCtx::new("u1", "s1", "ws1", Duration::from_secs(5))
    }

    struct EchoTool;
    #[async_trait]
    impl ToolHandler for EchoTool {
        async fn invoke(&self, arguments: Value, _ctx: &ToolCtx) -> Result<Value, ToolError> {
            Ok(arguments)
        }
    }

    struct AlwaysFailsTool;
    #[async_trait]
    impl ToolHandler for AlwaysFailsTool {
        async fn invoke(&self, _arguments: Value, _ctx: &ToolCtx) -> Result<Value, ToolError> {
            Err(ToolError::unavailable("down"))
        }
    }

    /// **Scenario**: a plain reply with no tool calls produces exactly one assistant message.
    #[tokio::test]
    async fn reply_without_tool_calls_produces_one_message() {
        let spec = AgentSpec::new(AgentName::Food, "food prompt", vec![]);
        let mut state = SessionState::new("s1", "u1", "ws1");
        state.messages.push(Message::user("hi"));
        let llm = MockLlm::fixed("Logged it!");
        let registry = ToolRegistry::new();
        let outcome = run_agent_turn(&spec, &state, &llm, &registry, &ctx(), &AgentLoopConfig::default()).await;
        assert_eq!(outcome.new_messages.len(), 1);
        assert_eq!(outcome.new_messages[0].content, "Logged it!");
        assert!(!outcome.handoff.should_handoff);
    }

    /// **Scenario**: a tool call round appends assistant+tool messages, then a final reply.
    #[tokio::test]
    async fn tool_call_round_appends_assistant_and_tool_messages() {
        let spec = AgentSpec::new(AgentName::Food, "food prompt", vec!["echo".into()]);
        let mut state = SessionState::new("s1", "u1", "ws1");
        state.messages.push(Message::user("log oatmeal"));

        let llm = MockLlm::from_responses(vec![
            LlmResponse {
                content: "".into(),
                tool_calls: vec![ToolCallRequest {
                    id: "call-1".into(),
                    name: "echo".into(),
                    arguments: "{}".into(),
                }],
                usage: None,
            },
            LlmResponse {
                content: "Done!".into(),
                tool_calls: vec![],
                usage: None,
            },
        ]);

        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDescriptor::new("echo", "echo", json!({"type": "object"}), SideEffect::Read, [AgentName::Food]),
            Arc::new(EchoTool),
        );

        let outcome = run_agent_turn(&spec, &state, &llm, &registry, &ctx(), &AgentLoopConfig::default()).await;
        assert_eq!(outcome.new_messages.len(), 3); // assistant-with-calls, tool, final assistant
        assert_eq!(outcome.new_messages.last().unwrap().content, "Done!");
    }

    /// **Scenario**: spec §8 scenario 5 — a tool that always fails exhausts MAX_TOOL_ROUNDS
    /// and produces an apologetic reply, recording StepLimitExceeded.
    #[tokio::test]
    async fn always_failing_tool_exhausts_loop_budget() {
        let spec = AgentSpec::new(AgentName::Food, "food prompt", vec!["fails".into()]);
        let mut state = SessionState::new("s1", "u1", "ws1");
        state.messages.push(Message::user("do something"));

        let always_calls_tool = LlmResponse {
            content: "".into(),
            tool_calls: vec![ToolCallRequest {
                id: "call-1".into(),
                name: "fails".into(),
                arguments: "{}".into(),
            }],
            usage: None,
        };
        let llm = MockLlm::from_responses(vec![always_calls_tool]);

        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDescriptor::new("fails", "fails", json!({"type": "object"}), SideEffect::Write, [AgentName::Food]),
            Arc::new(AlwaysFailsTool),
        );

        let config = AgentLoopConfig {
            max_tool_rounds: 3,
            ..Default::default()
        };
        let outcome = run_agent_turn(&spec, &state, &llm, &registry, &ctx(), &config).await;
        assert!(outcome.trace_entries.iter().any(|e| e.contains("StepLimitExceeded")));
        assert!(outcome.new_messages.last().unwrap().tool_calls.is_empty());
    }

    /// **Scenario**: an explicit request_handoff tool call is surfaced on the outcome.
    #[tokio::test]
    async fn explicit_handoff_call_is_surfaced() {
        let spec = AgentSpec::new(AgentName::Food, "food prompt", vec!["request_handoff".into()]);
        let mut state = SessionState::new("s1", "u1", "ws1");
        state.messages.push(Message::user("actually add a task for this"));

        let llm = MockLlm::from_responses(vec![LlmResponse {
            content: "".into(),
            tool_calls: vec![ToolCallRequest {
                id: "call-1".into(),
                name: "request_handoff".into(),
                arguments: r#"{"target":"task","reason":"user wants a task"}"#.into(),
            }],
            usage: None,
        }]);

        let mut registry = ToolRegistry::new();
        registry.register(
            builtin::handoff::descriptor(),
            Arc::new(builtin::handoff::RequestHandoffTool),
        );

        let config = AgentLoopConfig {
            max_tool_rounds: 1,
            ..Default::default()
        };
        let outcome = run_agent_turn(&spec, &state, &llm, &registry, &ctx(), &config).await;
        assert!(outcome.handoff.should_handoff);
        assert_eq!(outcome.handoff.target_agent, Some(AgentName::Task));
    }
}
