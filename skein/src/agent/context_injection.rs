//! Composes the synthetic "context" system message injected ahead of the pruned message tail
//! (spec §4.5 step 1).

use crate::agent::spec::AgentSpec;
use crate::message::Message;
use crate::state::SessionState;

pub fn compose_context_message(spec: &AgentSpec, state: &SessionState) -> Message {
    let previous_agent = state
        .previous_agent
        .map(|a| a.to_string())
        .unwrap_or_else(|| "none".to_string());
    let other_contexts = state.other_contexts_summary(spec.name);
    let own_context = state.context_for(spec.name).summarize();

    let mut text = format!(
        "{}\n\nuser_id: {}\nsession_id: {}\nworkspace: {}\nturn_count: {}\nprevious_agent: {}",
        spec.system_prompt, state.user_id, state.session_id, state.workspace, state.turn_count, previous_agent
    );

    if !other_contexts.is_empty() {
        text.push_str(&format!("\n\nOther agents' shared context:\n{other_contexts}"));
    }
    if !own_context.is_empty() {
        text.push_str(&format!("\n\nYour own context:\n{own_context}"));
    }

    Message::system(text)
}
