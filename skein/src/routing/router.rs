//! The hybrid Router (spec §4.4): deterministic keyword classifier with an LLM fallback,
//! producing a structured [`RoutingDecision`]. Routing MUST NOT fail a turn — every branch
//! resolves to a decision, falling back to the default agent on any anomaly.
//!
//! Grounded on `loom`'s ReAct `think` node pattern of calling the LLM with a `response_schema`
//! and treating provider failure as a recoverable branch rather than an error that aborts
//! the run.

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::agent_name::AgentName;
use crate::llm::{CompleteOptions, LlmCapability};
use crate::message::{Message, Role};
use crate::routing::decision::{RoutingDecision, RoutingSource};
use crate::routing::keyword;
use crate::state::SessionState;

/// Tunables the Router needs from `RuntimeConfig` (spec §6.3).
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    pub confidence_floor: f32,
    pub default_agent: AgentName,
    pub routing_temperature: f32,
    pub llm_deadline: std::time::Duration,
}

#[derive(Deserialize)]
struct LlmRoutingOutput {
    agent: String,
    confidence: f32,
    reason: String,
}

fn default_decision(reason: impl Into<String>, config: &RouterConfig, source: RoutingSource) -> RoutingDecision {
    RoutingDecision {
        agent: config.default_agent,
        confidence: 0.0,
        reason: reason.into(),
        source,
    }
}

/// Runs the four-step algorithm of spec §4.4 and returns a decision. Never returns an
/// `Err` — anomalies are absorbed into a default-agent decision per the "routing MUST NOT
/// fail the turn" requirement.
pub async fn route(state: &SessionState, llm: &dyn LlmCapability, config: &RouterConfig) -> RoutingDecision {
    // Step 1: explicit handoff path.
    if let Some(target) = state.target_agent {
        let decision = RoutingDecision::explicit(target);
        info!(agent = %decision.agent, confidence = decision.confidence, source = ?decision.source, "router decision");
        return decision;
    }

    let Some(last_user) = last_user_message(state) else {
        let decision = default_decision("no user message to route on; anomaly", config, RoutingSource::Keyword);
        warn!("router anomaly: last message is not from the user");
        info!(agent = %decision.agent, confidence = decision.confidence, source = ?decision.source, "router decision");
        return decision;
    };

    if last_user.trim().is_empty() {
        let decision = default_decision("empty user message", config, RoutingSource::Keyword);
        info!(agent = %decision.agent, confidence = decision.confidence, source = ?decision.source, "router decision");
        return decision;
    }

    // Step 2: keyword path.
    if let Some((agent, confidence)) = keyword::classify(last_user) {
        let decision = RoutingDecision {
            agent,
            confidence,
            reason: "keyword match".into(),
            source: RoutingSource::Keyword,
        };
        info!(agent = %decision.agent, confidence = decision.confidence, source = ?decision.source, "router decision");
        return decision;
    }

    // Step 3/4: LLM fallback.
    let decision = route_via_llm(state, last_user, llm, config).await;
    info!(agent = %decision.agent, confidence = decision.confidence, source = ?decision.source, "router decision");
    decision
}

fn last_user_message(state: &SessionState) -> Option<&str> {
    let last = state.messages.last()?;
    if last.role == Role::User {
        Some(last.content.as_str())
    } else {
        None
    }
}

async fn route_via_llm(
    state: &SessionState,
    last_user: &str,
    llm: &dyn LlmCapability,
    config: &RouterConfig,
) -> RoutingDecision {
    let agent_descriptions = AgentName::ALL
        .iter()
        .map(|a| format!("- {a}"))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Route the user's last message to exactly one agent.\nAgents:\n{agent_descriptions}\n\nLast user message: {last_user}"
    );

    let mut input = vec![Message::system(prompt)];
    let tail_start = state.messages.len().saturating_sub(4);
    input.extend(state.messages[tail_start..].iter().cloned());

    let options = CompleteOptions {
        temperature: config.routing_temperature,
        response_schema: Some(json!({
            "type": "object",
            "required": ["agent", "confidence", "reason"]
        })),
        deadline: config.llm_deadline,
    };

    let response = match crate::llm::complete_with_schema_retry(llm, &input, None, &options).await {
        Ok(r) => r,
        Err(e) => {
            return RoutingDecision {
                agent: config.default_agent,
                confidence: 0.0,
                reason: format!("llm error: {}", e.kind_name()),
                source: RoutingSource::Llm,
            };
        }
    };

    let parsed: Option<LlmRoutingOutput> = serde_json::from_str(&response.content).ok();
    let Some(parsed) = parsed else {
        return RoutingDecision {
            agent: config.default_agent,
            confidence: 0.0,
            reason: "llm error: unparsable routing output".into(),
            source: RoutingSource::Llm,
        };
    };

    if parsed.confidence < config.confidence_floor {
        return RoutingDecision {
            agent: config.default_agent,
            confidence: parsed.confidence,
            reason: "low-confidence default".into(),
            source: RoutingSource::Llm,
        };
    }

    let Some(agent) = AgentName::parse(&parsed.agent) else {
        return RoutingDecision {
            agent: config.default_agent,
            confidence: 0.0,
            reason: format!("llm named unregistered agent: {}", parsed.agent),
            source: RoutingSource::Llm,
        };
    };

    RoutingDecision {
        agent,
        confidence: parsed.confidence,
        reason: parsed.reason,
        source: RoutingSource::Llm,
    }
}
