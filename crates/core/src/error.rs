//! Error types for the Stockpilot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Stockpilot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Decision (model output parsing) errors ---
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    // --- Tool protocol errors ---
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response from model: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Remote tool call failed: {tool_name}: {reason}")]
    Remote { tool_name: String, reason: String },
}

/// Failures while turning model text into an intent.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("FUNCTION_CALL payload is not valid JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("FUNCTION_CALL payload is missing field `{0}`")]
    MissingField(&'static str),

    #[error("FUNCTION_CALL field `{field}` has the wrong type, expected {expected}")]
    WrongFieldType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Failures on the client/server tool transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to spawn tool server `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("Transport I/O failed: {0}")]
    Io(String),

    #[error("Handshake with tool server failed: {0}")]
    Handshake(String),

    #[error("Tool server closed the connection")]
    Closed,

    #[error("Invalid message from peer: {0}")]
    InvalidMessage(String),

    #[error("Peer returned error {code}: {message}")]
    Rpc { code: i64, message: String },
}
