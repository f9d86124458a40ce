//! `SessionState` (spec §3.1's `MultiAgentState`): the full per-session record that flows
//! through the Graph Runtime and round-trips through the Checkpointer.
//!
//! `graph::CompiledGraph::run_turn` takes `&mut SessionState` and mutates it in place hop by
//! hop (messages extended, `current_agent`/`target_agent`/`handoff_reason` reassigned, trace
//! entries pushed) rather than threading an immutable record through a delta-returning
//! pipeline — there is no separate delta type; each node writes the fields it owns directly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent_name::AgentName;
use crate::message::Message;
use crate::state::agent_context::AgentContext;

/// Full conversation state for one session (spec §3.1 `SessionState`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub user_id: String,
    pub workspace: String,
    pub messages: Vec<Message>,
    pub current_agent: Option<AgentName>,
    pub previous_agent: Option<AgentName>,
    pub target_agent: Option<AgentName>,
    pub handoff_reason: Option<String>,
    pub agent_contexts: HashMap<AgentName, AgentContext>,
    pub turn_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bounded per-turn trace of absorbed errors (spec §7 "Propagation policy": every
    /// absorbed error is recorded in a per-turn trace attached to the state).
    #[serde(default)]
    pub trace: Vec<String>,
}

/// Cap on `trace` entries retained across the state's lifetime (oldest dropped first).
pub const MAX_TRACE_ENTRIES: usize = 50;

impl SessionState {
    /// Creates a fresh state for a brand-new `session_id` (spec §3.3 Lifecycle), with an
    /// anchoring system message at index 0 (spec §4.6 pruning policy: "retain index 0").
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, workspace: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            workspace: workspace.into(),
            messages: vec![Message::system(
                "You are part of a multi-agent assistant. Route each request to the right specialist.",
            )],
            current_agent: None,
            previous_agent: None,
            target_agent: None,
            handoff_reason: None,
            agent_contexts: HashMap::new(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
            trace: Vec::new(),
        }
    }

    pub fn push_trace(&mut self, entry: impl Into<String>) {
        self.trace.push(entry.into());
        if self.trace.len() > MAX_TRACE_ENTRIES {
            let overflow = self.trace.len() - MAX_TRACE_ENTRIES;
            self.trace.drain(0..overflow);
        }
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::Assistant)
    }

    pub fn context_for(&self, agent: AgentName) -> AgentContext {
        self.agent_contexts.get(&agent).cloned().unwrap_or_default()
    }

    /// Summary of every *other* agent's context, for injection as "shared context" (spec
    /// §4.5 step 1).
    pub fn other_contexts_summary(&self, except: AgentName) -> String {
        let mut parts = Vec::new();
        for name in AgentName::ALL {
            if name == except {
                continue;
            }
            if let Some(ctx) = self.agent_contexts.get(&name) {
                if !ctx.is_empty() {
                    parts.push(format!("[{name}] {}", ctx.summarize()));
                }
            }
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a fresh state has exactly one anchoring system message and zero turns.
    #[test]
    fn new_state_has_anchor_message_and_zero_turns() {
        let state = SessionState::new("s1", "u1", "ws1");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, crate::message::Role::System);
        assert_eq!(state.turn_count, 0);
        assert!(state.current_agent.is_none());
    }

    /// **Scenario**: trace is capped at MAX_TRACE_ENTRIES, dropping the oldest first.
    #[test]
    fn trace_is_capped_dropping_oldest() {
        let mut state = SessionState::new("s1", "u1", "ws1");
        for i in 0..(MAX_TRACE_ENTRIES + 10) {
            state.push_trace(format!("entry-{i}"));
        }
        assert_eq!(state.trace.len(), MAX_TRACE_ENTRIES);
        assert_eq!(state.trace[0], "entry-10");
    }

    /// **Scenario**: other_contexts_summary excludes the named agent and skips empty contexts.
    #[test]
    fn other_contexts_summary_excludes_self_and_empties() {
        let mut state = SessionState::new("s1", "u1", "ws1");
        let mut food_ctx = AgentContext::new();
        food_ctx.replace(vec![("last_item".into(), "oatmeal".into())]);
        state.agent_contexts.insert(AgentName::Food, food_ctx);
        let summary = state.other_contexts_summary(AgentName::Task);
        assert!(summary.contains("food"));
        assert!(summary.contains("oatmeal"));
        assert!(!summary.contains("[task]"));
    }
}
