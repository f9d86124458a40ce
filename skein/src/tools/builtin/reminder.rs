//! `create_reminder`: the reminder agent's counterpart to `create_task`/`create_event`, feeding
//! the `fire_reminders` scheduler job (spec §4.8).

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
struct CreateReminderArgs {
    message: String,
    fire_at_unix: i64,
}

pub struct CreateReminderTool {
    store: Arc<Datastore>,
}

impl CreateReminderTool {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for CreateReminderTool {
    async fn invoke(&self, arguments: Value, ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: CreateReminderArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        let reminder = self
            .store
            .create_reminder(&ctx.user_id, &args.message, args.fire_at_unix)
            .await
            .map_err(|e| ToolError::unavailable(e.to_string()))?;
        Ok(json!({"id": reminder.id, "message": reminder.message, "fire_at_unix": reminder.fire_at_unix}))
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "create_reminder",
        "Create a reminder that fires at a given unix timestamp.",
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string"},
                "fire_at_unix": {"type": "number"}
            },
            "required": ["message", "fire_at_unix"]
        }),
        SideEffect::Write,
        [AgentName::Reminder],
    )
}
