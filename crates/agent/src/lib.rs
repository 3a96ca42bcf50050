//! The Stockpilot agent: a perceive → decide → act → synthesize loop.
//!
//! 1. **Perceive**: send the system prompt and the query to the LLM
//! 2. **Decide**: parse the reply into an [`Intent`]
//! 3. **Act**: call a remote tool, or verify a final answer
//! 4. **Synthesize**: ask the LLM to merge perception and action into an answer
//!
//! A synthesis that reads as final ends the run. Otherwise it is appended to
//! the query and the loop repeats, up to the iteration cap.

pub mod action;
pub mod classify;
pub mod decision;
pub mod loop_runner;
pub mod perception;
pub mod prompts;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use action::{ActionExecutor, ActionResult};
pub use classify::{ResponseKind, classify_response};
pub use decision::{Intent, parse_intent};
pub use loop_runner::{AgentLoop, RunOutcome, RunReport, error_chain};
pub use perception::{Perception, PerceptionResult};
pub use session::{ConversationState, IterationRecord, Session};
