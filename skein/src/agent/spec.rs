//! `AgentSpec`: process-global, immutable registration record for one agent (spec §6.3:
//! "the process registers each agent with: name, system prompt, allowed tool names, and an
//! optional temperature override").

use crate::agent_name::AgentName;

#[derive(Clone, Debug)]
pub struct AgentSpec {
    pub name: AgentName,
    pub system_prompt: String,
    /// Names of tools this agent may call (spec §6.3 "allowed tool names"). Enforced
    /// independently of `ToolDescriptor::owning_agents` at two points in `agent::loop_`: the
    /// tool list offered to the LLM is `tools_for(name)` intersected with this list, and any
    /// tool call naming something outside it is rejected with `ToolError::invalid_argument`
    /// before `ToolRegistry::invoke` runs. A tool must appear in both this list and its
    /// descriptor's `owning_agents` to actually be usable.
    pub allowed_tools: Vec<String>,
    pub temperature_override: Option<f32>,
}

impl AgentSpec {
    pub fn new(name: AgentName, system_prompt: impl Into<String>, allowed_tools: Vec<String>) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            allowed_tools,
            temperature_override: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature_override = Some(temperature);
        self
    }
}

/// The default registration for the four agents this build ships (spec §6.3; domains from
/// spec §1). `request_handoff` is appended to every agent's whitelist since any agent may
/// invoke it regardless of domain (spec §4.5 step 5).
pub fn default_specs() -> Vec<AgentSpec> {
    use crate::tools::builtin::handoff::REQUEST_HANDOFF_TOOL_NAME;

    vec![
        AgentSpec::new(
            AgentName::Food,
            "You are the food-logging specialist. Log what the user ate using log_food. \
             If the user asks for something outside food logging, call request_handoff.",
            vec!["log_food".into(), REQUEST_HANDOFF_TOOL_NAME.into()],
        ),
        AgentSpec::new(
            AgentName::Task,
            "You are the task-management specialist. Create and search tasks using \
             create_task and search_tasks. If the user asks for something outside tasks, call \
             request_handoff.",
            vec![
                "create_task".into(),
                "search_tasks".into(),
                REQUEST_HANDOFF_TOOL_NAME.into(),
            ],
        ),
        AgentSpec::new(
            AgentName::Event,
            "You are the calendar specialist. Schedule events using create_event. If the user \
             asks for something outside calendar events, call request_handoff.",
            vec!["create_event".into(), REQUEST_HANDOFF_TOOL_NAME.into()],
        ),
        AgentSpec::new(
            AgentName::Reminder,
            "You are the reminders specialist. Create reminders using create_reminder. If the \
             user asks for something outside reminders, call request_handoff.",
            vec!["create_reminder".into(), REQUEST_HANDOFF_TOOL_NAME.into()],
        ),
    ]
}
