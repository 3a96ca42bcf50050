//! `stockpilot agent` — Interactive or single-message logistics agent.
//!
//! Before the first query the operator is asked for anything the config
//! and flags left open: the API key and the warehouse profile.

use std::io::Write;
use std::sync::Arc;

use stockpilot_agent::{AgentLoop, RunOutcome, RunReport, Session};
use stockpilot_config::{AppConfig, WarehouseProfile};
use stockpilot_core::tool::ToolInvoker;
use stockpilot_mcp::StdioToolInvoker;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Line-oriented question/answer over any buffered reader.
pub struct Prompter<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    pub async fn ask(&mut self, label: &str) -> std::io::Result<Option<String>> {
        print!("  {label}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    /// Ask until a non-empty answer arrives. `None` at end of input.
    async fn ask_required(&mut self, label: &str) -> std::io::Result<Option<String>> {
        loop {
            match self.ask(label).await? {
                Some(answer) if answer.is_empty() => continue,
                other => return Ok(other),
            }
        }
    }
}

/// Flags win over the config file; whatever is still missing is asked for.
pub async fn complete_profile<R: AsyncBufRead + Unpin>(
    configured: &WarehouseProfile,
    flags: WarehouseProfile,
    prompter: &mut Prompter<R>,
) -> std::io::Result<WarehouseProfile> {
    let mut profile = WarehouseProfile {
        location: flags.location.or_else(|| configured.location.clone()),
        shipment_volume: flags
            .shipment_volume
            .or_else(|| configured.shipment_volume.clone()),
        automation_level: flags
            .automation_level
            .or_else(|| configured.automation_level.clone()),
    };

    if profile.location.is_none() {
        profile.location = prompter.ask_required("Warehouse location: ").await?;
    }
    if profile.shipment_volume.is_none() {
        profile.shipment_volume = prompter.ask_required("Daily shipment volume: ").await?;
    }
    if profile.automation_level.is_none() {
        let answer = prompter
            .ask("Automation level (low/medium/high, Enter to skip): ")
            .await?;
        profile.automation_level = answer.filter(|a| !a.is_empty());
    }
    Ok(profile)
}

/// The message to show for a finished run. A run stopped by the iteration
/// cap has none; the cap is logged instead.
pub fn render_outcome(report: &RunReport) -> Option<String> {
    match &report.outcome {
        RunOutcome::Completed { response, .. } => Some(response.trim().to_string()),
        RunOutcome::IterationCapReached { iterations, .. } => {
            tracing::warn!(
                iterations,
                "No final answer within the iteration limit, try rephrasing or adding details"
            );
            None
        }
    }
}

pub async fn run(
    message: Option<String>,
    flags: WarehouseProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()));

    println!();
    println!("  Welcome to Stockpilot, the logistics and warehouse agent.");
    println!();

    let api_key = match config.api_key_for(&config.default_provider) {
        Some(key) => key,
        None => prompter
            .ask_required(&format!("{} API key: ", config.default_provider))
            .await?
            .ok_or("No API key provided")?,
    };

    let profile = complete_profile(&config.warehouse, flags, &mut prompter).await?;

    let provider = stockpilot_providers::build_provider(
        &config,
        &config.default_provider,
        &api_key,
    );
    let invoker: Arc<dyn ToolInvoker> = Arc::new(StdioToolInvoker::from_config(&config, api_key));
    let agent = AgentLoop::from_config(&config, provider, invoker);

    let mut session = Session::new();
    session.set_profile(&profile);
    tracing::debug!(session = %session.id, "Session started");

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let report = agent.run(&mut session, &msg).await;
        eprint!("\r              \r");
        if let Some(text) = render_outcome(&report?) {
            println!("{text}");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.model_for(&config.default_provider));
    println!("  Warehouse: {}", profile.location.as_deref().unwrap_or("unknown"));
    println!();
    println!("  Type your logistics question and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    while let Some(query) = prompter.ask("You > ").await? {
        if query.is_empty() {
            continue;
        }
        if matches!(query.as_str(), "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        let result = agent.run(&mut session, &query).await;
        eprint!("\r     \r");
        match result {
            Ok(report) => {
                if let Some(text) = render_outcome(&report) {
                    println!();
                    for line in text.lines() {
                        println!("  Stockpilot > {line}");
                    }
                    println!();
                }
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
