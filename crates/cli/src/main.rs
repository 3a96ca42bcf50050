//! Stockpilot CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write the default config file
//! - `agent`   — Interactive or single-message logistics agent
//! - `tools`   — List the logistics tool catalog

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "stockpilot",
    about = "Stockpilot — warehouse and logistics agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Ask the logistics agent
    Agent {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Warehouse location
        #[arg(long)]
        location: Option<String>,

        /// Daily shipment volume
        #[arg(long)]
        volume: Option<String>,

        /// Automation level (low, medium, high)
        #[arg(long)]
        automation: Option<String>,
    },

    /// List the tools the agent can call
    Tools,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Agent {
            message,
            location,
            volume,
            automation,
        } => {
            let profile = stockpilot_config::WarehouseProfile {
                location,
                shipment_volume: volume,
                automation_level: automation,
            };
            commands::agent::run(message, profile).await?
        }
        Commands::Tools => commands::tools::run(),
    }

    Ok(())
}
