//! Logistics advisory tools for Stockpilot.
//!
//! Every tool is a prompt template from [`catalog::CATALOG`] bound to an LLM
//! provider. The tool server registers all of them; the agent only sees the
//! catalog through its system prompt.

pub mod advisory;
pub mod catalog;

use std::sync::Arc;

use stockpilot_core::provider::Provider;
use stockpilot_core::tool::ToolRegistry;

pub use advisory::AdvisoryTool;
pub use catalog::{CATALOG, Category, ParamKind, ParamSpec, ToolSpec};

/// Create a registry holding every catalog tool, all backed by `provider`.
///
/// `max_tokens` caps each tool's model answer.
pub fn default_registry(
    provider: Arc<dyn Provider>,
    model: &str,
    max_tokens: Option<u32>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for spec in CATALOG {
        registry.register(Box::new(
            AdvisoryTool::new(spec, provider.clone(), model).with_max_tokens(max_tokens),
        ));
    }
    registry
}
