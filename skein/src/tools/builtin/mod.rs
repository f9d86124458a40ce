//! Built-in tool handlers (spec §1: "the tool implementations themselves ... are not part of
//! the hard design; only the tool-execution contract is" — these exist to make the contract
//! exercisable end-to-end).

pub mod event;
pub mod food;
pub mod handoff;
pub mod reminder;
pub mod task;

use std::sync::Arc;

use crate::store::Datastore;
use crate::tools::registry::ToolRegistry;

/// Registers every built-in tool against a shared [`Datastore`] (spec §6.3 "at startup, the
/// process registers ... tool handlers").
pub fn register_all(registry: &mut ToolRegistry, store: Arc<Datastore>) {
    registry.register(food::descriptor(), Arc::new(food::LogFoodTool::new(Arc::clone(&store))));
    registry.register(
        task::create_task_descriptor(),
        Arc::new(task::CreateTaskTool::new(Arc::clone(&store))),
    );
    registry.register(
        task::search_tasks_descriptor(),
        Arc::new(task::SearchTasksTool::new(Arc::clone(&store))),
    );
    registry.register(
        event::descriptor(),
        Arc::new(event::CreateEventTool::new(Arc::clone(&store))),
    );
    registry.register(
        reminder::descriptor(),
        Arc::new(reminder::CreateReminderTool::new(store)),
    );
    registry.register(handoff::descriptor(), Arc::new(handoff::RequestHandoffTool));
}
