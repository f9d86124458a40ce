//! `create_event`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent_name::AgentName;
use crate::store::Datastore;
use crate::tools::ctx::ToolCtx;
use crate::tools::descriptor::{SideEffect, ToolDescriptor};
use crate::tools::registry::ToolHandler;
use crate::tools::result::ToolError;

#[derive(Deserialize)]
struct CreateEventArgs {
    title: String,
    starts_at_unix: i64,
    recurrence: Option<String>,
}

pub struct CreateEventTool {
    store: Arc<Datastore>,
}

impl CreateEventTool {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for CreateEventTool {
    async fn invoke(&self, arguments: Value, ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: CreateEventArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        let event = self
            .store
            .create_event(
                &ctx.user_id,
                &args.title,
                args.starts_at_unix,
                args.recurrence.as_deref(),
            )
            .await
            .map_err(|e| ToolError::unavailable(e.to_string()))?;
        Ok(json!({"id": event.id, "title": event.title, "starts_at_unix": event.starts_at_unix}))
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "create_event",
        "Create a calendar event with a title, start timestamp, and optional recurrence rule.",
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "starts_at_unix": {"type": "number"},
                "recurrence": {"type": "string"}
            },
            "required": ["title", "starts_at_unix"]
        }),
        SideEffect::Write,
        [AgentName::Event],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: creating an event persists the start timestamp unchanged.
    #[tokio::test]
    async fn create_event_persists_start_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(dir.path().join("s.db")).unwrap());
        let tool = CreateEventTool::new(store);
        let ctx = ToolCtx::new("u1", "s1", "ws1", std::time::Duration::from_secs(5));
        let result = tool
            .invoke(json!({"title": "dentist", "starts_at_unix": 123456}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["starts_at_unix"], 123456);
    }
}
