//! `ToolCtx`: per-invocation context handed to tool handlers (spec §4.2).

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Context passed to every `ToolHandler::invoke` call.
#[derive(Clone)]
pub struct ToolCtx {
    pub user_id: String,
    pub session_id: String,
    pub workspace: String,
    pub deadline: Duration,
    pub cancel: CancellationToken,
}

impl ToolCtx {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        workspace: impl Into<String>,
        deadline: Duration,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            workspace: workspace.into(),
            deadline,
            cancel: CancellationToken::new(),
        }
    }
}
