//! `AgentContext`: per-agent mutable blob, bounded (spec §3.1, §4.5 step 6, §9).
//!
//! Restated from the source's free-form string maps (spec §9) as a bounded record with a
//! maximum size enforced on write: the owning agent replaces its context wholesale each turn,
//! and overflow truncates oldest keys first rather than growing unboundedly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Max serialized size (bytes) of one agent's context before truncation kicks in.
pub const AGENT_CONTEXT_MAX_BYTES: usize = 4096;

/// One agent's bounded key-value context blob.
///
/// Keys are inserted in caller order; `BTreeMap` gives deterministic iteration so truncation
/// and serialization are reproducible (spec invariant: "serialization-stable").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    entries: BTreeMap<String, String>,
    /// Insertion order, oldest first; used to decide what to drop on overflow.
    order: Vec<String>,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    fn serialized_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(k, v)| k.len() + v.len() + 2)
            .sum()
    }

    /// Replaces the whole context (spec: "write ... is a bounded update (replace, not
    /// append)"), then truncates oldest keys until the total size is within budget.
    pub fn replace(&mut self, entries: Vec<(String, String)>) {
        self.entries.clear();
        self.order.clear();
        for (k, v) in entries {
            self.order.push(k.clone());
            self.entries.insert(k, v);
        }
        self.truncate_to_budget();
    }

    fn truncate_to_budget(&mut self) {
        while self.serialized_len() > AGENT_CONTEXT_MAX_BYTES && !self.order.is_empty() {
            let oldest = self.order.remove(0);
            self.entries.remove(&oldest);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A compact one-line-per-key rendering for injection into another agent's context
    /// summary (spec §4.5 step 1: "compact summary of other agents' contexts").
    pub fn summarize(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: replace overwrites prior entries rather than appending to them.
    #[test]
    fn replace_overwrites_not_appends() {
        let mut ctx = AgentContext::new();
        ctx.replace(vec![("a".into(), "1".into())]);
        ctx.replace(vec![("b".into(), "2".into())]);
        assert_eq!(ctx.get("a"), None);
        assert_eq!(ctx.get("b"), Some("2"));
    }

    /// **Scenario**: overflow truncates the oldest keys first, keeping size under budget.
    #[test]
    fn overflow_truncates_oldest_keys_first() {
        let mut ctx = AgentContext::new();
        let big_value = "x".repeat(AGENT_CONTEXT_MAX_BYTES / 2);
        ctx.replace(vec![
            ("oldest".into(), big_value.clone()),
            ("newest".into(), big_value),
        ]);
        assert_eq!(ctx.get("oldest"), None, "oldest key should be dropped");
        assert!(ctx.get("newest").is_some(), "newest key should survive");
    }

    /// **Scenario**: summarize renders a compact "key: value; key: value" line.
    #[test]
    fn summarize_renders_compact_line() {
        let mut ctx = AgentContext::new();
        ctx.replace(vec![("pending_task".into(), "write spec".into())]);
        assert_eq!(ctx.summarize(), "pending_task: write spec");
    }
}
