//! Action: carry out an [`Intent`] and describe what happened.

use std::sync::Arc;

use stockpilot_core::error::Error;
use stockpilot_core::tool::ToolInvoker;
use tracing::{debug, info};

use crate::classify::{ResponseKind, classify_response};
use crate::decision::Intent;

/// Text describing the outcome of an action, fed into the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub text: String,
}

impl ActionResult {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn tool_response(text: &str) -> Self {
        Self::new(format!("[MCP Response] {text}"))
    }

    /// An `[Error] ...` result for failures the loop recovers from.
    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("[Error] {detail}"))
    }

    pub fn is_error(&self) -> bool {
        self.text.starts_with("[Error]")
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

pub struct ActionExecutor {
    invoker: Arc<dyn ToolInvoker>,
}

impl ActionExecutor {
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self { invoker }
    }

    /// Execute `intent`.
    ///
    /// Only a failed remote tool call is an error; every other intent maps to
    /// a result string.
    pub async fn execute(&self, intent: &Intent) -> Result<ActionResult, Error> {
        match intent {
            Intent::FunctionCall {
                tool_name,
                arguments,
            } => {
                info!(tool = %tool_name, "Invoking tool");
                let text = self.invoker.invoke(tool_name, arguments.clone()).await?;
                debug!(tool = %tool_name, response = %text, "Tool responded");
                Ok(ActionResult::tool_response(&text))
            }
            Intent::FinalAnswer { text } => Ok(Self::verify(text)),
            Intent::CompleteRun => Ok(Self::verify("")),
            Intent::Unknown => Ok(ActionResult::error("Unknown action.")),
        }
    }

    fn verify(text: &str) -> ActionResult {
        match classify_response(text) {
            ResponseKind::FinalAnswer => ActionResult::new(format!("[Final Answer] {text}")),
            ResponseKind::CompleteRun => ActionResult::new("[Complete] Logistics task finished."),
            ResponseKind::Unknown => ActionResult::new(format!("[Unverified] {text}")),
        }
    }
}
