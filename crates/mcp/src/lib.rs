//! Model Context Protocol plumbing for Stockpilot.
//!
//! - [`server::McpServer`] hosts a tool registry as an `rmcp` server
//!   (stdio in the `stockpilot-mcp` binary).
//! - [`client::call_tool_once`] runs one client session against such a
//!   server over any transport.
//! - [`stdio::StdioToolInvoker`] is the agent-side [`ToolInvoker`]: one
//!   spawned server process per tool call.
//!
//! [`ToolInvoker`]: stockpilot_core::tool::ToolInvoker

pub mod client;
pub mod server;
pub mod stdio;

pub use client::call_tool_once;
pub use server::McpServer;
pub use stdio::StdioToolInvoker;
