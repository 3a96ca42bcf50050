//! LLM Provider implementations for Stockpilot.
//!
//! All providers implement the `stockpilot_core::Provider` trait.
//! [`router::build_provider`] picks one by name from configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_provider;

use stockpilot_core::error::ProviderError;

/// Map a non-success HTTP status to a provider error.
pub(crate) fn status_error(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited,
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// HTTP client with a whole-request timeout.
///
/// If the builder fails the default client is used; that is logged because
/// the default client has no timeout.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            tracing::error!(
                error = %e,
                timeout_secs,
                "Failed to build HTTP client, falling back to one without a timeout"
            );
            reqwest::Client::new()
        })
}
