//! `MockLlm`: deterministic stand-in for a real provider, used across the test suite the way
//! `loom::llm::MockLlm` backs `loom`'s own tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{CompleteOptions, LlmCapability, LlmError, LlmResponse};
use crate::message::Message;
use crate::tools::ToolDescriptor;

/// Queues canned responses; each `complete` call pops the next one (repeating the last once
/// exhausted), so tests can script a multi-round reason/act loop deterministically.
pub struct MockLlm {
    queue: Mutex<Vec<LlmResponse>>,
    embedding_dim: usize,
}

impl MockLlm {
    /// A single fixed text reply with no tool calls.
    pub fn fixed(content: impl Into<String>) -> Self {
        Self::from_responses(vec![LlmResponse {
            content: content.into(),
            tool_calls: vec![],
            usage: None,
        }])
    }

    /// A sequence of plain-text replies (content only, no tool calls); useful for
    /// schema-retry tests where `content` is the thing under test.
    pub fn sequenced(contents: Vec<String>) -> Self {
        Self::from_responses(
            contents
                .into_iter()
                .map(|content| LlmResponse {
                    content,
                    tool_calls: vec![],
                    usage: None,
                })
                .collect(),
        )
    }

    pub fn from_responses(responses: Vec<LlmResponse>) -> Self {
        Self {
            queue: Mutex::new(responses),
            embedding_dim: 8,
        }
    }

    /// An `LlmCapability` that always errors the same way (for error-path tests).
    pub fn unavailable() -> MockLlmError {
        MockLlmError(LlmError::Unavailable("mock provider down".into()))
    }
}

#[async_trait]
impl LlmCapability for MockLlm {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDescriptor]>,
        _options: &CompleteOptions,
    ) -> Result<LlmResponse, LlmError> {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() > 1 {
            Ok(queue.remove(0))
        } else {
            Ok(queue.first().cloned().unwrap_or_default())
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|_| vec![0.0; self.embedding_dim]).collect())
    }
}

/// Always returns the configured error; used to exercise LLM failure paths (spec §4.5 step 5,
/// router fallback error path in spec §4.4 step 4).
pub struct MockLlmError(pub LlmError);

#[async_trait]
impl LlmCapability for MockLlmError {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDescriptor]>,
        _options: &CompleteOptions,
    ) -> Result<LlmResponse, LlmError> {
        Err(self.0.clone())
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(self.0.clone())
    }
}
