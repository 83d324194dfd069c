//! Translation from provider-agnostic conversation types to the OpenAI
//! chat-completions request format.

use serde_json::{json, Value};

use mathagent_tool_runtime::{conversation::ConversationMessage, tool::ToolDefinition};

/// Translate a [`ToolDefinition`] into the OpenAI function-tool format.
pub(super) fn tool_definition_to_openai(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        },
    })
}

/// Translate a [`ConversationMessage`] into an OpenAI chat message object.
pub(super) fn message_to_openai(msg: &ConversationMessage) -> Value {
    match msg {
        ConversationMessage::User(text) => json!({
            "role": "user",
            "content": text,
        }),
        ConversationMessage::Assistant(content) => {
            let mut message = json!({
                "role": "assistant",
                "content": content.text,
            });
            if !content.tool_calls.is_empty() {
                let calls: Vec<Value> = content
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                // OpenAI expects arguments as a JSON-encoded string
                                "arguments": tc.input.to_string(),
                            },
                        })
                    })
                    .collect();
                message["tool_calls"] = Value::Array(calls);
            }
            message
        }
        ConversationMessage::ToolResult(result) => json!({
            "role": "tool",
            "tool_call_id": result.tool_call_id,
            "content": result.content,
        }),
    }
}

/// Build the full `/chat/completions` request body.
pub(super) fn build_request_body(
    model: &str,
    messages: &[ConversationMessage],
    system_prompt: Option<&str>,
    tools: &[ToolDefinition],
    temperature: f32,
    max_tokens: u32,
) -> Value {
    let mut api_messages = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system_prompt {
        api_messages.push(json!({ "role": "system", "content": system }));
    }
    api_messages.extend(messages.iter().map(message_to_openai));

    let mut body = json!({
        "model": model,
        "messages": api_messages,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });

    if !tools.is_empty() {
        body["tools"] = tools.iter().map(tool_definition_to_openai).collect();
        body["tool_choice"] = json!("auto");
    }

    body
}
