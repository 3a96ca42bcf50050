//! Provider selection: turns a provider name from config into a client.

use std::sync::Arc;
use stockpilot_config::AppConfig;
use stockpilot_core::provider::Provider;
use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build one provider by name with an explicit API key.
///
/// `gemini` talks the native Gemini API; every other name is treated as an
/// OpenAI-compatible endpoint.
pub fn build_provider(config: &AppConfig, name: &str, api_key: &str) -> Arc<dyn Provider> {
    let timeout = config.agent.llm_timeout_secs;
    let custom_url = config.providers.get(name).and_then(|p| p.api_url.clone());

    if name == "gemini" {
        let mut p = GeminiProvider::new(api_key).with_timeout_secs(timeout);
        if let Some(url) = custom_url {
            p = p.with_base_url(url);
        }
        Arc::new(p)
    } else {
        let base_url = custom_url.unwrap_or_else(|| default_base_url(name));
        Arc::new(OpenAiCompatProvider::new(name, base_url, api_key).with_timeout_secs(timeout))
    }
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
