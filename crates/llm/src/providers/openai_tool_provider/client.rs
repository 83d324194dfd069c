use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use tracing::{debug, trace};

use mathagent_tool_runtime::{
    conversation::ConversationMessage,
    provider::{Completion, LlmError, ToolAwareLlmProvider},
    tool::ToolDefinition,
};

use super::response::{parse_completion, status_error};
use super::translate::build_request_body;

/// Google's OpenAI-compatible Gemini endpoint.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Provider for any OpenAI-compatible `/chat/completions` endpoint with
/// function calling (OpenAI, Gemini's compatibility layer, vLLM, ...).
pub struct OpenAiToolProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl OpenAiToolProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token; `None` sends no `Authorization` header
    /// * `model` - Model name (e.g. `"gemini-2.0-flash"`)
    /// * `base_url` - API base including the version prefix
    ///   (e.g. `"https://api.openai.com/v1"`)
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
            request_timeout: None,
        }
    }

    /// Abort any single HTTP request that takes longer than `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub(super) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn network_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::NetworkError(format!("request timed out: {e}"))
    } else {
        LlmError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl ToolAwareLlmProvider for OpenAiToolProvider {
    async fn complete_with_tools(
        &self,
        messages: Vec<ConversationMessage>,
        system_prompt: Option<String>,
        tools: Vec<ToolDefinition>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        let url = self.completions_url();
        let body = build_request_body(
            &self.model,
            &messages,
            system_prompt.as_deref(),
            &tools,
            temperature,
            max_tokens,
        );

        debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "OpenAI request to {}", url);
        trace!(%body, "request body");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "OpenAI request failed");
            return Err(status_error(status.as_u16(), retry_after, &text));
        }

        let completion = parse_completion(&text)?;
        debug!(
            tool_calls = completion.tool_calls.len(),
            stop_reason = ?completion.stop_reason,
            "OpenAI response"
        );
        Ok(completion)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
