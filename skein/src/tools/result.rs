//! `ToolResult` / `ToolError` (spec §4.2, §7).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidArgument,
    Internal,
    DeadlineExceeded,
    Unavailable,
}

#[derive(Debug, Error, Clone)]
#[error("{kind:?}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::Internal,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded() -> Self {
        Self {
            kind: ToolErrorKind::DeadlineExceeded,
            message: "tool execution deadline exceeded".into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::Unavailable,
            message: message.into(),
        }
    }
}

/// `ToolResult = {ok, value?, error?}` (spec §4.2): never raised to the caller, always handed
/// back to the LLM as a tool message (spec §4.5 "Failure semantics").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorPayload {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolResult {
    pub fn ok(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn err(error: ToolError) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(ToolErrorPayload {
                kind: error.kind,
                message: error.message,
            }),
        }
    }

    /// Rendering handed to the LLM as the content of a `Role::Tool` message.
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"ok\":false}".to_string())
    }
}
