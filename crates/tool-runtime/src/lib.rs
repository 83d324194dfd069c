pub mod agent;
pub mod conversation;
pub mod provider;
pub mod registry;
pub mod runtime;
pub mod tool;
pub mod tools;

pub use agent::Agent;
pub use conversation::{AssistantContent, Conversation, ConversationMessage};
pub use provider::{Completion, LlmError, StopReason, ToolAwareLlmProvider, Usage};
pub use registry::{RegistryError, ToolRegistry};
pub use runtime::{AgenticLoop, AgenticLoopError, RunResult, ToolStep};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolError, ToolResult};
pub use tools::{register_math_tools, DomainError, MathTool, Operation};
