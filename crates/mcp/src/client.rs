//! Client side: one MCP session per tool call.

use rmcp::model::{CallToolRequestParam, CallToolResult};
use rmcp::service::ServiceError;
use rmcp::transport::IntoTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Map, Value};
use stockpilot_core::error::{Error, ProtocolError, ToolError};
use tracing::{debug, warn};

/// Connect over `transport`, call `tool_name` once and close the session.
///
/// A result flagged `isError` becomes [`ToolError::Remote`] carrying the
/// result text.
pub async fn call_tool_once<T, E, A>(
    transport: T,
    tool_name: &str,
    arguments: Map<String, Value>,
) -> Result<String, Error>
where
    T: IntoTransport<RoleClient, E, A>,
    E: std::error::Error + Send + Sync + 'static,
{
    let client = ()
        .serve(transport)
        .await
        .map_err(|e| ProtocolError::Handshake(e.to_string()))?;
    debug!(tool = tool_name, "Session initialized");

    let outcome = client
        .call_tool(CallToolRequestParam {
            name: tool_name.to_string().into(),
            arguments: Some(arguments),
        })
        .await;

    if let Err(e) = client.cancel().await {
        warn!(error = %e, "Tool session did not shut down cleanly");
    }

    let (text, is_error) = read_result(&outcome.map_err(service_error)?)?;
    if is_error {
        return Err(ToolError::Remote {
            tool_name: tool_name.to_string(),
            reason: text,
        }
        .into());
    }
    Ok(text)
}

/// Text parts of a tool result joined with newlines, and its error flag.
///
/// Non-text parts are skipped.
pub(crate) fn read_result(result: &CallToolResult) -> Result<(String, bool), ProtocolError> {
    let wire =
        serde_json::to_value(result).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;

    let text = wire["content"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| p["type"] == "text")
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();
    let is_error = wire["isError"].as_bool().unwrap_or(false);
    Ok((text, is_error))
}

fn service_error(err: ServiceError) -> ProtocolError {
    match err {
        ServiceError::McpError(e) => ProtocolError::Rpc {
            code: i64::from(e.code.0),
            message: e.message.to_string(),
        },
        ServiceError::TransportClosed => ProtocolError::Closed,
        other => ProtocolError::Io(other.to_string()),
    }
}
