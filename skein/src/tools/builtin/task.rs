//! `create_task` / `search_tasks` (spec §8 scenarios 1/3).

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
struct CreateTaskArgs {
    title: String,
    due_at_unix: Option<i64>,
    #[serde(default = "default_priority")]
    priority: String,
}

fn default_priority() -> String {
    "normal".to_string()
}

pub struct CreateTaskTool {
    store: Arc<Datastore>,
}

impl CreateTaskTool {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for CreateTaskTool {
    async fn invoke(&self, arguments: Value, ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: CreateTaskArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        let task = self
            .store
            .create_task(&ctx.user_id, &args.title, args.due_at_unix, &args.priority)
            .await
            .map_err(|e| ToolError::unavailable(e.to_string()))?;
        Ok(json!({"id": task.id, "title": task.title, "priority": task.priority}))
    }
}

pub fn create_task_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "create_task",
        "Create a new task with a title, optional due timestamp, and priority.",
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "due_at_unix": {"type": "number"},
                "priority": {"type": "string"}
            },
            "required": ["title"]
        }),
        SideEffect::Write,
        [AgentName::Task],
    )
}

#[derive(Deserialize)]
struct SearchTasksArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    10
}

pub struct SearchTasksTool {
    store: Arc<Datastore>,
}

impl SearchTasksTool {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for SearchTasksTool {
    async fn invoke(&self, arguments: Value, ctx: &ToolCtx) -> Result<Value, ToolError> {
        let args: SearchTasksArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_argument(e.to_string()))?;
        let tasks = self
            .store
            .search_tasks(&ctx.user_id, &args.query, args.limit)
            .await
            .map_err(|e| ToolError::unavailable(e.to_string()))?;
        let items: Vec<Value> = tasks
            .into_iter()
            .map(|t| json!({"id": t.id, "title": t.title, "priority": t.priority, "completed": t.completed}))
            .collect();
        Ok(json!({"tasks": items}))
    }
}

pub fn search_tasks_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "search_tasks",
        "Search previously created tasks by a substring of their title.",
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "number"}
            },
            "required": ["query"]
        }),
        SideEffect::Read,
        [AgentName::Task],
    )
    .idempotent()
}
