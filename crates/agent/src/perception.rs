//! Perception: one LLM round trip for a system prompt and a query.

use std::sync::Arc;
use std::time::Duration;

use stockpilot_core::error::ProviderError;
use stockpilot_core::provider::{Provider, ProviderRequest};
use tracing::debug;

/// Build the combined prompt sent to the model.
pub fn perception_prompt(system_prompt: &str, query: &str) -> String {
    format!("{system_prompt}\n\nLogistics Query: {query}")
}

/// The exact prompt sent and the trimmed text received.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionResult {
    pub prompt: String,
    pub response: String,
}

pub struct Perception {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Perception {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `system_prompt` and `query` as one prompt and return the trimmed
    /// reply text.
    pub async fn perceive(
        &self,
        system_prompt: &str,
        query: &str,
    ) -> Result<PerceptionResult, ProviderError> {
        let prompt = perception_prompt(system_prompt, query);
        debug!(provider = self.provider.name(), model = %self.model, chars = prompt.len(), "Perceiving");

        let request = ProviderRequest::prompt(&self.model, prompt.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })??;

        debug!(response = %response.message.content, "Model responded");
        Ok(PerceptionResult {
            prompt,
            response: response.message.content.trim().to_string(),
        })
    }
}
