pub mod openai_tool_provider;

pub use openai_tool_provider::OpenAiToolProvider;
