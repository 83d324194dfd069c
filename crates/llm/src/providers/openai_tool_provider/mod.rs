//! OpenAI-compatible implementation of [`ToolAwareLlmProvider`].
//!
//! Speaks the non-streaming `/chat/completions` API with function calling,
//! translating between the OpenAI wire format and the provider-agnostic
//! [`ConversationMessage`] / [`Completion`] types.
//!
//! [`ToolAwareLlmProvider`]: mathagent_tool_runtime::ToolAwareLlmProvider
//! [`ConversationMessage`]: mathagent_tool_runtime::ConversationMessage
//! [`Completion`]: mathagent_tool_runtime::Completion

mod client;
mod response;
mod translate;

pub use self::client::{OpenAiToolProvider, DEFAULT_MODEL, GEMINI_OPENAI_BASE_URL};
