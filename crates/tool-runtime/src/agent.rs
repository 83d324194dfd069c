use std::sync::Arc;

use crate::registry::{RegistryError, ToolRegistry};
use crate::tool::ToolDefinition;
use crate::tools::register_math_tools;

pub const MATH_ASSISTANT_NAME: &str = "Assistant";
pub const MATH_ASSISTANT_INSTRUCTIONS: &str =
    "You are a helpful assistant who performs mathematical operations.";

/// A named persona: instructions plus the tools the model may call.
///
/// Immutable once built; share it behind an `Arc` or by reference.
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools,
        }
    }

    /// The calculator agent with all nine math tools registered.
    pub fn math_assistant() -> Result<Self, RegistryError> {
        let mut registry = ToolRegistry::new();
        register_math_tools(&mut registry)?;
        Ok(Self::new(
            MATH_ASSISTANT_NAME,
            MATH_ASSISTANT_INSTRUCTIONS,
            Arc::new(registry),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.list()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools.len())
            .finish()
    }
}
