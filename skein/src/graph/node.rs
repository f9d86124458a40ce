//! `Next`: a node's transition decision, mirroring `loom::graph::Node::run`'s
//! `Next::{Continue, Node(id), End}` shape, restated for this graph's fixed two-node topology
//! (`Router`, `Agent(a)`) plus the `Continue?` decision (spec §4.6).

/// Where control goes after a node runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Re-enter the Router (a handoff was requested).
    Router,
    /// Terminate the graph for this turn.
    End,
}
