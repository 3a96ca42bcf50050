//! LLM-backed advisory tool.
//!
//! Renders a catalog template, asks the model to reason step by step about
//! it, and returns the trimmed answer as the tool output.

use std::sync::Arc;

use async_trait::async_trait;
use stockpilot_core::error::ToolError;
use stockpilot_core::provider::{Provider, ProviderRequest};
use stockpilot_core::tool::{Tool, ToolOutput};
use tracing::{debug, warn};

use crate::catalog::ToolSpec;

const REASONING_PREFIX: &str =
    "Please explain step-by-step how you arrived at the following conclusion: ";

/// Wrap a rendered template in the step-by-step reasoning request.
pub fn reasoning_prompt(prompt: &str) -> String {
    format!("{REASONING_PREFIX}{prompt}")
}

/// A catalog entry bound to a provider.
pub struct AdvisoryTool {
    spec: &'static ToolSpec,
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: Option<u32>,
}

impl AdvisoryTool {
    pub fn new(spec: &'static ToolSpec, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            spec,
            provider,
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Tool for AdvisoryTool {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn description(&self) -> &str {
        self.spec.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.spec.input_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let prompt = reasoning_prompt(&self.spec.render(&arguments)?);
        debug!(tool = self.spec.name, prompt = %prompt, "Calling model for tool");

        let request = ProviderRequest::prompt(&self.model, prompt).with_max_tokens(self.max_tokens);
        let response = self.provider.complete(request).await.map_err(|e| {
            warn!(tool = self.spec.name, error = %e, "Model call failed");
            ToolError::ExecutionFailed {
                tool_name: self.spec.name.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(ToolOutput::text(response.message.content.trim()))
    }
}
