//! `LLMError` taxonomy (spec §4.3, §7).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LlmError {
    #[error("llm call timed out")]
    Timeout,
    #[error("llm provider rate limited the request")]
    RateLimited,
    #[error("llm provider unavailable: {0}")]
    Unavailable(String),
    #[error("structured output schema violation: {0}")]
    SchemaViolation(String),
    /// Non-retryable; MUST propagate to the Agent Loop (spec §4.3).
    #[error("llm context window overflow")]
    ContextOverflow,
}

impl LlmError {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LlmError::Timeout => "Timeout",
            LlmError::RateLimited => "RateLimited",
            LlmError::Unavailable(_) => "Unavailable",
            LlmError::SchemaViolation(_) => "SchemaViolation",
            LlmError::ContextOverflow => "ContextOverflow",
        }
    }
}
