//! Decoding of chat-completions responses and error bodies.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use mathagent_tool_runtime::provider::{Completion, LlmError, StopReason, Usage};
use mathagent_tool_runtime::tool::ToolCall;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    function: ApiFunction,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

pub(super) fn parse_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("tool_calls") | Some("function_call") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}

/// Decode tool-call arguments. Models occasionally send an empty string or
/// malformed JSON; those become an empty object so the tool reports the
/// missing fields itself.
fn parse_arguments(name: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(tool = name, error = %e, "unparseable tool arguments");
        Value::Object(Default::default())
    })
}

/// Decode a successful response body into a [`Completion`].
pub(super) fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let resp: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("malformed completion: {e}")))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0]".into()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, call)| ToolCall {
            // Some compatible backends leave the id blank
            id: if call.id.is_empty() {
                format!("call_{index}")
            } else {
                call.id
            },
            input: parse_arguments(&call.function.name, &call.function.arguments),
            name: call.function.name,
        })
        .collect();

    Ok(Completion {
        text: choice.message.content,
        tool_calls,
        stop_reason: parse_finish_reason(choice.finish_reason.as_deref()),
        usage: resp.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Handles both `{"error": {"message": ..}}` and the list-wrapped
/// `[{"error": {"message": ..}}]` shape; falls back to the raw body.
pub(super) fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v["error"]["message"]
                .as_str()
                .or_else(|| v[0]["error"]["message"].as_str())
        })
        .map(String::from)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Map a non-success HTTP status to an [`LlmError`].
pub(super) fn status_error(status: u16, retry_after: Option<u64>, body: &str) -> LlmError {
    let message = error_message(body);
    match status {
        401 | 403 => LlmError::AuthError(message),
        429 => LlmError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(0),
        },
        _ => LlmError::ApiError { status, message },
    }
}
