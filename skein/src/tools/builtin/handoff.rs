//! `request_handoff(target, reason)` (spec §4.5 step 5): the agent's explicit way to signal a
//! cross-domain handoff, preferred over the implicit LLM-detected path (see
//! `agent::handoff` for how the two are reconciled).
//!
//! This handler only validates the target and acknowledges; the actual decision is read by
//! the Agent Loop directly off the assistant's tool-call arguments (not this return value) so
//! it is visible even if a later tool round overwrites the working message list's tail.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent_name::AgentName;
use crate::tools::ctx::ToolCtx;
use crate::tools::descriptor::{SideEffect, ToolDescriptor};
use crate::tools::registry::ToolHandler;
use crate::tools::result::ToolError;

pub const REQUEST_HANDOFF_TOOL_NAME: &str = "request_handoff";

#[derive(Deserialize)]
pub struct RequestHandoffArgs {
    pub target: String,
    pub reason: String,
}

pub struct RequestHandoffTool;

#[async_trait]
impl ToolHandler for RequestHandoffTool {
    async fn invoke(&self, arguments: Value, _ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: RequestHandoffArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        if AgentName::parse(&args.target).is_none() {
            return Err(ToolError::invalid_argument(format!(
                "unknown handoff target: {}",
                args.target
            )));
        }
        Ok(json!({"acknowledged": true, "target": args.target}))
    }
}

/// Every agent may call this, independent of its domain tool whitelist — it is how any agent
/// exits its own domain (spec §4.5 step 5).
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        REQUEST_HANDOFF_TOOL_NAME,
        "Hand off the conversation to a different specialist agent when the user's request is outside your domain.",
        json!({
            "type": "object",
            "properties": {
                "target": {"type": "string"},
                "reason": {"type": "string"}
            },
            "required": ["target", "reason"]
        }),
        SideEffect::Read,
        AgentName::ALL,
    )
    .idempotent()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: an unknown handoff target is rejected before any state changes.
    #[tokio::test]
    async fn unknown_target_is_rejected() {
        let tool = RequestHandoffTool;
        let ctx = ToolCtx::new("u1", "s1", "ws1", std::time::Duration::from_secs(5));
        let result = tool
            .invoke(json!({"target": "not_a_real_agent", "reason": "x"}), &ctx)
            .await;
        assert!(result.is_err());
    }

    /// **Scenario**: a valid target is acknowledged.
    #[tokio::test]
    async fn valid_target_is_acknowledged() {
        let tool = RequestHandoffTool;
        let ctx = ToolCtx::new("u1", "s1", "ws1", std::time::Duration::from_secs(5));
        let result = tool
            .invoke(json!({"target": "task", "reason": "needs a task created"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["acknowledged"], true);
    }
}
