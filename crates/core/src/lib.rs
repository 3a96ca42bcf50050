//! # Stockpilot Core
//!
//! Domain types, traits, and error definitions for the Stockpilot logistics
//! agent. This crate has **no framework dependencies**: it defines the model
//! that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external boundary is a trait defined here:
//! - [`Provider`] — the LLM backend ("generate text for model M")
//! - [`Tool`] — a named, schema-described operation served by the tool server
//! - [`ToolInvoker`] — how the agent reaches tools living in another process
//!
//! Implementations live in their own crates, so the agent loop can be tested
//! with scripted providers and in-process invokers.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{DecisionError, Error, ProtocolError, ProviderError, Result, ToolError};
pub use memory::MemoryStore;
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolInvoker, ToolOutput, ToolRegistry};
