//! Handoff detection (spec §4.5 step 5): explicit `request_handoff` tool call wins when
//! present; otherwise a small structured-output LLM call decides; any LLM error is treated as
//! no-handoff (spec: "on any LLM error, treat as no-handoff" — see DESIGN.md's resolution of
//! the "explicit vs. implicit" Open Question).

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::agent_name::AgentName;
use crate::llm::{CompleteOptions, LlmCapability};
use crate::message::{Message, ToolCallRequest};
use crate::tools::builtin::handoff::{RequestHandoffArgs, REQUEST_HANDOFF_TOOL_NAME};

#[derive(Clone, Debug, Default)]
pub struct HandoffDecision {
    pub should_handoff: bool,
    pub target_agent: Option<AgentName>,
    pub reason: Option<String>,
}

impl HandoffDecision {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Scans the assistant's tool calls for an explicit `request_handoff` invocation. Returns
/// `None` if absent or its arguments/target don't parse, letting the caller fall through to
/// the implicit LLM check.
pub fn detect_explicit(tool_calls: &[ToolCallRequest]) -> Option<HandoffDecision> {
    let call = tool_calls.iter().find(|tc| tc.name == REQUEST_HANDOFF_TOOL_NAME)?;
    let args: RequestHandoffArgs = serde_json::from_str(&call.arguments).ok()?;
    let target = AgentName::parse(&args.target)?;
    Some(HandoffDecision {
        should_handoff: true,
        target_agent: Some(target),
        reason: Some(args.reason),
    })
}

#[derive(Deserialize)]
struct ImplicitHandoffOutput {
    should_handoff: bool,
    target_agent: Option<String>,
    reason: Option<String>,
}

/// The implicit path (spec §4.5 step 5 second bullet): asked only when no explicit
/// `request_handoff` call was made.
pub async fn detect_implicit(
    last_user_message: &str,
    agent_reply: &str,
    current_agent: AgentName,
    llm: &dyn LlmCapability,
    deadline: std::time::Duration,
) -> HandoffDecision {
    let available = AgentName::ALL
        .iter()
        .filter(|a| **a != current_agent)
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Given the user's message and the agent's reply, decide whether the conversation \
         should hand off to a different specialist agent.\n\nCurrent agent: {current_agent}\n\
         Other available agents: {available}\nUser message: {last_user_message}\nAgent reply: \
         {agent_reply}"
    );

    let options = CompleteOptions {
        temperature: 0.0,
        response_schema: Some(json!({
            "type": "object",
            "required": ["should_handoff"]
        })),
        deadline,
    };

    let response = match crate::llm::complete_with_schema_retry(llm, &[Message::system(prompt)], None, &options).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "implicit handoff detection failed; treating as no-handoff");
            return HandoffDecision::none();
        }
    };

    let Ok(parsed) = serde_json::from_str::<ImplicitHandoffOutput>(&response.content) else {
        warn!("implicit handoff output did not parse; treating as no-handoff");
        return HandoffDecision::none();
    };

    if !parsed.should_handoff {
        return HandoffDecision::none();
    }

    let Some(target) = parsed.target_agent.as_deref().and_then(AgentName::parse) else {
        return HandoffDecision::none();
    };

    HandoffDecision {
        should_handoff: true,
        target_agent: Some(target),
        reason: parsed.reason,
    }
}
