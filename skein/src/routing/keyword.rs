//! Deterministic keyword classifier (spec §4.4 step 2).

use crate::agent_name::AgentName;

/// Per-agent unordered token/phrase sets, lowercase, checked word-boundary against the
/// last user message. Small and hand-curated; not meant to be exhaustive — the LLM fallback
/// covers what this misses.
fn keywords_for(agent: AgentName) -> &'static [&'static str] {
    match agent {
        AgentName::Food => &[
            "ate", "eat", "eating", "food", "meal", "breakfast", "lunch", "dinner", "snack",
            "calories", "log that i",
        ],
        AgentName::Task => &[
            "task", "todo", "to-do", "remind me to", "add a task", "complete", "due", "checklist",
        ],
        AgentName::Event => &[
            "schedule", "calendar", "event", "meeting", "appointment", "tomorrow", "next week",
        ],
        AgentName::Reminder => &["reminder", "remind me at", "notify me", "alert me"],
    }
}

/// Word-boundary, case-folded occurrence count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.contains(' ') {
        haystack.matches(needle).count()
    } else {
        haystack
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| *word == needle)
            .count()
    }
}

/// Per-agent keyword score for `last_user_message` (spec §4.4 step 2).
pub fn score(last_user_message: &str) -> Vec<(AgentName, usize)> {
    let folded = last_user_message.to_lowercase();
    AgentName::ALL
        .iter()
        .map(|&agent| {
            let total: usize = keywords_for(agent)
                .iter()
                .map(|kw| count_occurrences(&folded, kw))
                .sum();
            (agent, total)
        })
        .collect()
}

/// Result of the keyword path: a confident winner, or none. Requires `top >= 2` and
/// `top` to strictly exceed `2 * second` — an exact tie at `top == 2 * second` falls through
/// to the LLM (spec §8 boundary property and the "Keyword ambiguity" end-to-end scenario both
/// exercise this exact tie as non-confident, which is the authoritative reading over §4.4's
/// looser prose).
pub fn classify(last_user_message: &str) -> Option<(AgentName, f32)> {
    let mut scores = score(last_user_message);
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (top_agent, top_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0);

    if top_score >= 2 && top_score > 2 * second_score {
        Some((top_agent, (top_score as f32 / 4.0).min(1.0)))
    } else {
        None
    }
}
