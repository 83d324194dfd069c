use crate::conversation::ConversationMessage;
use crate::tool::{ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM providers that support tool use.
///
/// This trait lives in tool-runtime (not in crates/llm) because it's
/// defined by the consumer (the agentic loop), not the provider.
/// Implementations live in crates/llm.
#[async_trait]
pub trait ToolAwareLlmProvider: Send + Sync {
    /// Send the conversation with tool definitions available and return the
    /// model's reply: final text, tool-invocation requests, or both.
    async fn complete_with_tools(
        &self,
        messages: Vec<ConversationMessage>,
        system_prompt: Option<String>,
        tools: Vec<ToolDefinition>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, LlmError>;

    /// Provider name for logging/debugging (e.g., "openai")
    fn provider_name(&self) -> &str;
}

/// One assistant reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: Option<Usage>,
}

impl Completion {
    /// A plain text reply that ends the turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A reply requesting tool execution.
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            stop_reason: StopReason::ToolUse,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Normal end of response
    #[default]
    EndTurn,
    /// Model wants to use tools
    ToolUse,
    /// Hit max tokens limit
    MaxTokens,
    /// Response withheld by the provider's content filter
    ContentFilter,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Mock LLM provider for testing the agentic loop without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A mock provider that replays pre-configured replies in FIFO order.
    pub struct MockLlmProvider {
        responses: Mutex<VecDeque<Result<Completion, LlmError>>>,
        requests: Mutex<Vec<Vec<ConversationMessage>>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue a reply that will be returned after all earlier ones.
        pub fn queue_response(&self, completion: Completion) {
            self.responses.lock().unwrap().push_back(Ok(completion));
        }

        /// Queue a simple text reply.
        pub fn queue_text(&self, text: &str) {
            self.queue_response(Completion::text(text));
        }

        /// Queue a reply calling a single tool.
        pub fn queue_tool_call(&self, id: &str, name: &str, input: serde_json::Value) {
            self.queue_response(Completion::tool_calls(vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]));
        }

        /// Queue a provider failure.
        pub fn queue_error(&self, error: LlmError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        /// Conversations received so far, one entry per request.
        pub fn requests(&self) -> Vec<Vec<ConversationMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ToolAwareLlmProvider for MockLlmProvider {
        async fn complete_with_tools(
            &self,
            messages: Vec<ConversationMessage>,
            _system_prompt: Option<String>,
            _tools: Vec<ToolDefinition>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<Completion, LlmError> {
            self.requests.lock().unwrap().push(messages);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Completion::default()))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}
