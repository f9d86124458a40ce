//! State model: `SessionState`, per-agent `AgentContext`, and the pruning policy (spec §3, §4.6).

pub mod agent_context;
pub mod pruning;
pub mod session_state;

pub use agent_context::{AgentContext, AGENT_CONTEXT_MAX_BYTES};
pub use pruning::{prune, DEFAULT_STATE_MAX_MESSAGES};
pub use session_state::{SessionState, MAX_TRACE_ENTRIES};
