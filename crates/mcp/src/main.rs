//! `stockpilot-mcp` — the logistics tool server.
//!
//! Speaks MCP over stdin/stdout. Logs go to stderr so they never corrupt
//! the protocol stream.

use anyhow::Context;
use clap::Parser;
use stockpilot_config::AppConfig;
use stockpilot_mcp::McpServer;

#[derive(Parser)]
#[command(
    name = "stockpilot-mcp",
    about = "Stockpilot logistics tool server (MCP over stdio)",
    version
)]
struct Args {
    /// API key for the LLM provider backing the tools
    #[arg(long)]
    env_key: String,

    /// Provider name (defaults to the configured provider)
    #[arg(long)]
    provider: Option<String>,

    /// Model name (defaults to the provider's configured model)
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if args.env_key.trim().is_empty() {
        anyhow::bail!("--env-key must not be empty");
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    let provider_name = args.provider.unwrap_or_else(|| config.default_provider.clone());
    let model = args.model.unwrap_or_else(|| config.model_for(&provider_name));

    let provider = stockpilot_providers::build_provider(&config, &provider_name, &args.env_key);
    let registry = stockpilot_tools::default_registry(provider, &model, Some(config.default_max_tokens));
    tracing::info!(provider = %provider_name, model = %model, "Starting tool server");

    McpServer::new("Logistics MCP", registry)
        .run_stdio()
        .await
        .context("tool server stream failed")?;

    Ok(())
}
