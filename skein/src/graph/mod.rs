//! Graph Runtime (spec §4.6): `START → prune → Router → Agent(current) → Continue?`, bounded
//! by `MAX_HANDOFFS`.

pub mod node;
pub mod run_context;
pub mod state_graph;

pub use node::Next;
pub use run_context::RunContext;
pub use state_graph::{CompiledGraph, DEFAULT_MAX_HANDOFFS};
