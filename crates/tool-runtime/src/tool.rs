use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::tools::math::DomainError;

/// Describes a tool's interface for LLM consumption.
/// Maps to OpenAI's function format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "multiply", "square_root")
    pub name: String,
    /// Human-readable description for the LLM
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
    /// JSON Schema describing the produced value. Not sent to the model.
    #[serde(default)]
    pub output_schema: Value,
}

/// Represents an LLM requesting execution of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this invocation (used to match results)
    pub id: String,
    /// Tool name to execute
    pub name: String,
    /// JSON input arguments
    pub input: Value,
}

/// Result of executing a tool, sent back to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Must match the ToolCall id
    pub tool_call_id: String,
    /// Result content (text or structured)
    pub content: String,
    /// Whether this result represents an error
    pub is_error: bool,
}

impl ToolResult {
    /// Error result for a call that could not be executed.
    pub fn error(tool_call_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: format!("Tool error: {}", message),
            is_error: true,
        }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_without_output_schema() {
        let json = r#"{"name":"add","description":"Add two numbers.","input_schema":{"type":"object"}}"#;
        let def: ToolDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.name, "add");
        assert!(def.output_schema.is_null());
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_001".to_string(),
            name: "multiply".to_string(),
            input: serde_json::json!({"a": 6, "b": 9}),
        };
        let json = serde_json::to_string(&call).unwrap();
        let parsed: ToolCall = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "call_001");
        assert_eq!(parsed.input["b"], 9);
    }

    #[test]
    fn test_error_result() {
        let result = ToolResult::error("call_9", DomainError::DivisionByZero);
        assert!(result.is_error);
        assert_eq!(result.tool_call_id, "call_9");
        assert_eq!(result.content, "Tool error: Cannot divide by zero.");
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::from(DomainError::NegativeFactorial);
        assert_eq!(
            err.to_string(),
            "The factorial of a negative number does not exist."
        );
        let err = ToolError::InvalidInput("missing field `b`".to_string());
        assert_eq!(err.to_string(), "Invalid input: missing field `b`");
    }
}
