//! Pruning policy (spec §4.6): bounded trimming of `messages`, preserving the anchor message
//! and never splitting a tool-call group.

use crate::message::{Message, Role};

/// `STATE_MAX_MESSAGES` default (spec §6.3).
pub const DEFAULT_STATE_MAX_MESSAGES: usize = 20;

/// Applies the pruning policy in place. No-op when `messages.len() <= max_messages`.
///
/// Algorithm (spec §4.6):
/// 1. Always retain index 0 (the anchoring system/context message, if present).
/// 2. Retain the last `max_messages - 1` messages.
/// 3. If the window boundary would split an assistant-with-tool-calls message from its
///    matching tool messages, extend the window backward until the whole group is included.
pub fn prune(messages: &mut Vec<Message>, max_messages: usize) {
    if messages.len() <= max_messages || max_messages == 0 {
        return;
    }

    let has_anchor = !messages.is_empty();
    let tail_budget = if has_anchor {
        max_messages.saturating_sub(1)
    } else {
        max_messages
    };

    let total = messages.len();
    let mut window_start = total.saturating_sub(tail_budget);
    // Never let the window start below index 1 (index 0 is the anchor, kept separately).
    let floor = if has_anchor { 1 } else { 0 };
    window_start = window_start.max(floor);

    // Extend the window backward while it would split a tool-call group: a Tool message at
    // window_start whose matching assistant tool_calls message lives before the window.
    while window_start > floor {
        let splits_group = messages[window_start..]
            .iter()
            .take_while(|m| m.role == Role::Tool)
            .count()
            > 0
            && assistant_owner_before(messages, window_start);
        if splits_group {
            window_start -= 1;
        } else {
            break;
        }
    }

    let mut kept: Vec<Message> = Vec::with_capacity(max_messages);
    if has_anchor {
        kept.push(messages[0].clone());
    }
    kept.extend_from_slice(&messages[window_start..]);
    *messages = kept;
}

/// True if some message before `window_start` is an assistant-with-tool-calls message whose
/// ids are referenced by a tool message at-or-after `window_start`.
fn assistant_owner_before(messages: &[Message], window_start: usize) -> bool {
    let first_tool_ids: Vec<&str> = messages[window_start..]
        .iter()
        .take_while(|m| m.role == Role::Tool)
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    if first_tool_ids.is_empty() {
        return false;
    }
    messages[..window_start].iter().any(|m| {
        m.is_tool_call_group_start()
            && m.tool_calls
                .iter()
                .any(|tc| first_tool_ids.contains(&tc.id.as_str()))
    })
}
