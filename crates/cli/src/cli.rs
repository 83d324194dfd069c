use clap::Parser;

/// Interactive math agent.
///
/// Asks a hosted model to answer math questions, letting it call the
/// built-in calculator tools. Every flag is optional.
#[derive(Parser, Debug)]
#[command(name = "mathagent", about = "Interactive math agent backed by an LLM")]
pub struct CliArgs {
    /// Model name override (default: gemini-2.0-flash)
    #[arg(long, env = "MATHAGENT_MODEL")]
    pub model: Option<String>,

    /// OpenAI-compatible base URL override, including the version prefix
    #[arg(long, env = "MATHAGENT_BASE_URL")]
    pub base_url: Option<String>,

    /// API key (overrides env var and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to config file (default: <config dir>/mathagent/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Maximum model round-trips per question
    #[arg(long)]
    pub max_iterations: Option<usize>,
}
