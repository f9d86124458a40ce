//! `AgentName`: the registered set of domain-specialized agents (spec §3.1).
//!
//! The base set (`food`, `task`, `event`) plus `reminder` are registered by this
//! implementation (see SPEC_FULL.md §2); `memory` is left unregistered per the Open Question
//! resolution in DESIGN.md. Unknown names are a routing error (spec §3.1), represented here by
//! `AgentName::parse` returning `None` rather than panicking.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Food,
    Task,
    Event,
    Reminder,
}

impl AgentName {
    /// All agents this build registers, in registration order (the first is the conventional
    /// default per spec §4.4 step 3).
    pub const ALL: [AgentName; 4] = [
        AgentName::Food,
        AgentName::Task,
        AgentName::Event,
        AgentName::Reminder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Food => "food",
            AgentName::Task => "task",
            AgentName::Event => "event",
            AgentName::Reminder => "reminder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "food" => Some(AgentName::Food),
            "task" => Some(AgentName::Task),
            "event" => Some(AgentName::Event),
            "reminder" => Some(AgentName::Reminder),
            _ => None,
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: parse is the inverse of as_str for every registered name.
    #[test]
    fn parse_roundtrips_all_registered_names() {
        for a in AgentName::ALL {
            assert_eq!(AgentName::parse(a.as_str()), Some(a));
        }
    }

    /// **Scenario**: unknown names parse to None rather than panicking (spec §3.1).
    #[test]
    fn parse_rejects_unknown_name() {
        assert_eq!(AgentName::parse("memory"), None);
        assert_eq!(AgentName::parse(""), None);
    }
}
