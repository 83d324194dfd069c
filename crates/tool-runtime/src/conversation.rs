use crate::tool::{ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

/// A message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConversationMessage {
    /// User's text input
    User(String),
    /// Assistant's response (may contain text and/or tool calls)
    Assistant(AssistantContent),
    /// Result of a tool execution
    ToolResult(ToolResult),
}

/// Content from the assistant that can contain mixed text and tool calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantContent {
    /// Text blocks in the response
    pub text: Option<String>,
    /// Tool calls requested by the assistant
    pub tool_calls: Vec<ToolCall>,
}

/// History of a single dispatched turn.
///
/// Turns are independent: a new `Conversation` is started for every query
/// and dropped once the final answer is produced.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
    /// System prompt (sent ahead of every request)
    system_prompt: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn add_user_message(&mut self, text: String) {
        self.messages.push(ConversationMessage::User(text));
    }

    pub fn add_assistant_response(&mut self, content: AssistantContent) {
        self.messages.push(ConversationMessage::Assistant(content));
    }

    pub fn add_tool_result(&mut self, result: ToolResult) {
        self.messages.push(ConversationMessage::ToolResult(result));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }
}
