//! Message: the append-only unit of a conversation (spec §3.1).
//!
//! Unlike a minimal `System`/`User`/`Assistant` enum, a turn in this orchestrator also carries
//! tool calls and tool results, plus provenance (`agent`) and a `timestamp`, so the Graph
//! Runtime can enforce the tool-call-group invariant (spec §3.1, §8) purely by inspecting the
//! message log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One tool call requested by an assistant message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, validated against the tool's `parameter_schema` before invoke.
    pub arguments: String,
}

/// Append-only conversation unit (spec §3.1).
///
/// **Invariant**: every `Role::Tool` message has a preceding `Role::Assistant` message with a
/// matching `tool_calls` entry id, within the same turn (checked in `state::pruning` and by
/// `graph::Continue` before persisting).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// May be empty when `tool_calls` is non-empty (assistant proposing calls, no prose yet).
    pub content: String,
    /// Ordered; only ever non-empty on `Role::Assistant`.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Set only on `Role::Tool`; must match one id in a preceding assistant's `tool_calls`.
    #[serde(default)]
    pub tool_call_id: Option<String>,
    /// Producing agent name; set on `Role::Assistant` and `Role::Tool`, `None` on `System`/`User`.
    #[serde(default)]
    pub agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            agent: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            agent: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            agent: Some(agent.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        agent: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
            agent: Some(agent.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn tool(content: impl Into<String>, agent: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
            agent: Some(agent.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_tool_call_group_start(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the expected role and fields.
    #[test]
    fn constructors_set_expected_role_and_fields() {
        let sys = Message::system("hi");
        assert_eq!(sys.role, Role::System);
        assert!(sys.agent.is_none());

        let usr = Message::user("hello");
        assert_eq!(usr.role, Role::User);

        let ast = Message::assistant("reply", "food");
        assert_eq!(ast.role, Role::Assistant);
        assert_eq!(ast.agent.as_deref(), Some("food"));

        let tool = Message::tool("{}", "food", "call-1");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
    }

    /// **Scenario**: a Message round-trips through serde without loss (checkpointer relies on this).
    #[test]
    fn message_serde_roundtrip() {
        let msg = Message::assistant_with_tool_calls(
            "",
            "food",
            vec![ToolCallRequest {
                id: "call-1".into(),
                name: "log_food".into(),
                arguments: "{\"item\":\"oatmeal\"}".into(),
            }],
        );
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tool_calls.len(), 1);
        assert_eq!(back.tool_calls[0].name, "log_food");
    }
}
