mod cli;
mod config;
mod repl;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use mathagent_llm::OpenAiToolProvider;
use mathagent_tool_runtime::{Agent, AgenticLoop};

use crate::cli::CliArgs;
use crate::config::CliConfig;
use crate::repl::Repl;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();

    // Logs go to stderr so they never interleave with answers
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;

    let model = config.resolve_model(args.model.as_deref());
    let base_url = config.resolve_base_url(args.base_url.as_deref());
    let api_key = config.resolve_api_key(args.api_key.as_deref());
    if api_key.is_none() {
        warn!(
            env = %config.api_key_env,
            "No API key configured; requests will fail authentication"
        );
    }

    let mut provider = OpenAiToolProvider::new(api_key, model.clone(), base_url);
    if let Some(timeout) = config.request_timeout() {
        provider = provider.with_request_timeout(timeout);
    }

    let agent = Agent::math_assistant().context("failed to register math tools")?;
    let agentic_loop = AgenticLoop::new(Arc::new(provider))
        .with_max_iterations(args.max_iterations.unwrap_or(config.max_iterations))
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    info!(agent = agent.name(), model = %model, "Starting session");

    let mut terminal = Terminal::stdio();
    terminal.print_banner(&model)?;

    Repl::new(&agent, &agentic_loop, terminal).run().await
}
