//! LLM Capability (spec §4.3): chat-completion and embedding abstraction with structured-output
//! decode, plus per-call-site temperature (spec: "routing uses a low-temperature completion;
//! agents use a higher one ... MUST NOT share a cached client instance keyed only on model").
//!
//! Grounded on `loom::llm::LlmClient` (trait shape: `invoke(messages) -> LlmResponse`) and
//! `loom::llm::MockLlm`, generalized here to cover tool-call round trips, JSON-schema-validated
//! structured output, and embeddings (spec §4.3's `embed`).

mod error;
mod mock;
mod openai;

pub use error::LlmError;
pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde_json::Value;

use crate::message::{Message, ToolCallRequest};
use crate::tools::ToolDescriptor;

/// Token usage for one LLM call.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a chat-completion round trip (spec §4.3).
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Option<LlmUsage>,
}

/// Options for one `complete` call: temperature and an optional response schema for
/// structured-output decode (spec §4.3).
#[derive(Clone, Debug)]
pub struct CompleteOptions {
    pub temperature: f32,
    /// When set, `content` MUST validate against this JSON Schema; implementations retry
    /// (bounded, N <= 2) on parse/validation failure before surfacing `SchemaViolation`.
    pub response_schema: Option<Value>,
    pub deadline: std::time::Duration,
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            response_schema: None,
            deadline: std::time::Duration::from_secs(30),
        }
    }
}

/// Chat-completion and embedding capability (spec §4.3).
///
/// Implementations: [`MockLlm`] (deterministic, for tests), [`ChatOpenAI`] (real API).
#[async_trait]
pub trait LlmCapability: Send + Sync {
    /// One synchronous round trip; no streaming visible to the core (spec: non-goal).
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
        options: &CompleteOptions,
    ) -> Result<LlmResponse, LlmError>;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Retry budget for schema-constrained completions (spec §4.3: "N <= 2").
pub const MAX_SCHEMA_RETRIES: u32 = 2;

/// Calls `complete` and, when a `response_schema` is set, retries up to [`MAX_SCHEMA_RETRIES`]
/// times if `content` fails to parse as JSON matching the schema's shape (shallow check: valid
/// JSON; full JSON-Schema validation is a tool/provider concern outside this core).
pub async fn complete_with_schema_retry(
    llm: &dyn LlmCapability,
    messages: &[Message],
    tools: Option<&[ToolDescriptor]>,
    options: &CompleteOptions,
) -> Result<LlmResponse, LlmError> {
    let mut attempt = 0;
    loop {
        let response = llm.complete(messages, tools, options).await?;
        if options.response_schema.is_none() {
            return Ok(response);
        }
        if serde_json::from_str::<Value>(&response.content).is_ok() {
            return Ok(response);
        }
        if attempt >= MAX_SCHEMA_RETRIES {
            return Err(LlmError::SchemaViolation(format!(
                "content did not parse as JSON after {attempt} retries"
            )));
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlm;

    /// **Scenario**: schema-constrained completion retries on invalid JSON then succeeds.
    #[tokio::test]
    async fn schema_retry_succeeds_after_retries() {
        let llm = MockLlm::sequenced(vec!["not json".into(), "{\"ok\":true}".into()]);
        let options = CompleteOptions {
            response_schema: Some(serde_json::json!({"type": "object"})),
            ..Default::default()
        };
        let result = complete_with_schema_retry(&llm, &[], None, &options)
            .await
            .unwrap();
        assert_eq!(result.content, "{\"ok\":true}");
    }

    /// **Scenario**: all attempts invalid surfaces SchemaViolation (spec §8 boundary).
    #[tokio::test]
    async fn schema_retry_exhausted_surfaces_violation() {
        let llm = MockLlm::sequenced(vec!["x".into(), "y".into(), "z".into()]);
        let options = CompleteOptions {
            response_schema: Some(serde_json::json!({"type": "object"})),
            ..Default::default()
        };
        let err = complete_with_schema_retry(&llm, &[], None, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::SchemaViolation(_)));
    }
}
