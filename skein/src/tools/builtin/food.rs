//! `log_food` (spec §8 scenario 1).

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
struct LogFoodArgs {
    item: String,
    meal: Option<String>,
}

pub struct LogFoodTool {
    store: Arc<Datastore>,
}

impl LogFoodTool {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for LogFoodTool {
    async fn invoke(&self, arguments: Value, ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: LogFoodArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        let log = self
            .store
            .log_food(&ctx.user_id, &args.item, args.meal.as_deref())
            .await
            .map_err(|e| ToolError::unavailable(e.to_string()))?;
        Ok(json!({"id": log.id, "item": log.item, "meal": log.meal}))
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "log_food",
        "Log a food item the user ate, optionally tagged with a meal (breakfast/lunch/dinner/snack).",
        json!({
            "type": "object",
            "properties": {
                "item": {"type": "string"},
                "meal": {"type": "string"}
            },
            "required": ["item"]
        }),
        SideEffect::Write,
        [AgentName::Food],
    )
}
