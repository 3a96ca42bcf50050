//! Tool invocation through a freshly spawned tool server process.
//!
//! Every call spawns the server, runs the handshake, makes exactly one
//! `tools/call` and closes the session, which ends the child.

use async_trait::async_trait;
use rmcp::transport::TokioChildProcess;
use serde_json::{Map, Value};
use stockpilot_config::AppConfig;
use stockpilot_core::error::{Error, ProtocolError};
use stockpilot_core::tool::ToolInvoker;
use tokio::process::Command;
use tracing::info;

use crate::client::call_tool_once;

/// Invokes remote tools by spawning `command args... --env-key <key>`.
pub struct StdioToolInvoker {
    command: String,
    args: Vec<String>,
    api_key: String,
    provider: Option<String>,
    model: Option<String>,
}

impl StdioToolInvoker {
    pub fn new(command: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            api_key: api_key.into(),
            provider: None,
            model: None,
        }
    }

    /// Take command, extra args, provider and model from configuration.
    pub fn from_config(config: &AppConfig, api_key: impl Into<String>) -> Self {
        Self {
            command: config.tool_server.command.clone(),
            args: config.tool_server.args.clone(),
            api_key: api_key.into(),
            provider: Some(config.default_provider.clone()),
            model: Some(config.model_for(&config.default_provider)),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Full argument list passed to the server process.
    fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("--env-key".into());
        args.push(self.api_key.clone());
        if let Some(provider) = &self.provider {
            args.push("--provider".into());
            args.push(provider.clone());
        }
        if let Some(model) = &self.model {
            args.push("--model".into());
            args.push(model.clone());
        }
        args
    }

    fn spawn(&self) -> Result<TokioChildProcess, ProtocolError> {
        let mut command = Command::new(&self.command);
        command.args(self.command_args());
        TokioChildProcess::new(command).map_err(|e| ProtocolError::Spawn {
            command: self.command.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ToolInvoker for StdioToolInvoker {
    async fn invoke(&self, tool_name: &str, arguments: Map<String, Value>) -> Result<String, Error> {
        info!(tool = tool_name, command = %self.command, "Invoking remote tool");
        let child = self.spawn()?;
        call_tool_once(child, tool_name, arguments).await
    }
}
