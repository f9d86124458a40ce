//! Orchestrator Facade (spec §4.7): the single per-turn entry point over the Graph Runtime,
//! Checkpointer, and a concurrent-turn guard.

mod error;
mod facade;

pub use error::OrchestratorError;
pub use facade::{ChatTurnReply, ChatTurnRequest, Orchestrator, OrchestratorConfig};
