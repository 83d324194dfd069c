pub mod providers;

pub use providers::openai_tool_provider::{
    OpenAiToolProvider, DEFAULT_MODEL, GEMINI_OPENAI_BASE_URL,
};
