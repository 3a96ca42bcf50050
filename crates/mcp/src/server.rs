//! Tool server: exposes a [`ToolRegistry`] as an MCP server.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use stockpilot_core::error::ProtocolError;
use stockpilot_core::tool::ToolRegistry;
use tracing::{info, warn};

#[derive(Clone)]
pub struct McpServer {
    name: String,
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            registry: Arc::new(registry),
        }
    }

    /// Descriptors for `tools/list`, sorted by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .definitions()
            .into_iter()
            .map(|def| {
                let schema = match def.input_schema {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                Tool::new(def.name, def.description, Arc::new(schema))
            })
            .collect()
    }

    /// Run one tool. Tool failures, unknown names included, become error
    /// results rather than protocol errors.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let arguments = arguments.map(Value::Object).unwrap_or(Value::Null);
        info!(tool = name, "Calling tool");
        match self.registry.execute(name, arguments).await {
            Ok(output) => CallToolResult::success(vec![Content::text(output.text)]),
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    /// Serve over stdin/stdout until the client closes its end.
    pub async fn run_stdio(self) -> Result<(), ProtocolError> {
        info!(server = %self.name, tools = self.registry.len(), "Tool server ready");

        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| ProtocolError::Handshake(e.to_string()))?;
        let reason = service
            .waiting()
            .await
            .map_err(|e| ProtocolError::Io(e.to_string()))?;

        info!(?reason, "Client closed the stream, shutting down");
        Ok(())
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.protocol_version = ProtocolVersion::V_2024_11_05;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = self.name.clone();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}
