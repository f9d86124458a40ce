//! The Agent Loop (spec §4.5): reason/act loop, context injection, handoff detection.

pub mod context_injection;
pub mod handoff;
pub mod loop_;
pub mod spec;

pub use handoff::HandoffDecision;
pub use loop_::{run_agent_turn, AgentLoopConfig, AgentTurnOutcome};
pub use spec::{default_specs, AgentSpec};
