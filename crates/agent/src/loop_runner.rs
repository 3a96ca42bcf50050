//! The orchestration loop.
//!
//! Each iteration perceives the current query, decides on an intent, acts
//! on it, then asks the model to synthesize perception and action into a
//! user-facing answer. A synthesis that reads as final ends the run; else
//! the synthesis is appended to the query and the loop goes around again,
//! up to the iteration cap.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stockpilot_config::AppConfig;
use stockpilot_core::error::Error;
use stockpilot_core::provider::Provider;
use stockpilot_core::tool::ToolInvoker;
use tracing::{debug, error, info, warn};

use crate::action::{ActionExecutor, ActionResult};
use crate::classify::{ResponseKind, classify_response};
use crate::decision::{Intent, parse_intent};
use crate::perception::Perception;
use crate::prompts::{follow_up_query, synthesis_prompt, system_prompt};
use crate::session::{IterationRecord, Session};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A synthesis was classified as final; `response` is the message to show.
    Completed { kind: ResponseKind, response: String },
    /// The cap was hit without a final synthesis. Nothing is emitted.
    IterationCapReached {
        iterations: u32,
        last_response: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub trace: Vec<IterationRecord>,
}

impl RunReport {
    /// The terminal message, if the run produced one.
    pub fn final_message(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Completed { response, .. } => Some(response),
            RunOutcome::IterationCapReached { .. } => None,
        }
    }
}

/// Render an error with every `source()` in its chain.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// The perceive/decide/act/synthesize loop.
pub struct AgentLoop {
    perception: Perception,
    actions: ActionExecutor,
    max_iterations: u32,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            perception: Perception::new(provider, model),
            actions: ActionExecutor::new(invoker),
            max_iterations: 3,
        }
    }

    /// Build a loop with model, sampling, timeout and cap taken from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        let perception = Perception::new(provider, config.model_for(&config.default_provider))
            .with_temperature(config.default_temperature)
            .with_max_tokens(Some(config.default_max_tokens))
            .with_timeout(Duration::from_secs(config.agent.llm_timeout_secs));
        Self {
            perception,
            actions: ActionExecutor::new(invoker),
            max_iterations: config.agent.max_iterations,
        }
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Process one user query to completion or to the iteration cap.
    ///
    /// The session's loop state is reset on every exit path; its memory is
    /// left untouched.
    pub async fn run(&self, session: &mut Session, query: &str) -> Result<RunReport, Error> {
        info!(session = %session.id, model = self.perception.model(), "Starting run");
        session.state.reset();

        let result = self.drive(session, query).await;
        let trace = std::mem::take(&mut session.state.trace);
        session.state.reset();

        match result {
            Ok(outcome) => {
                info!(session = %session.id, iterations = trace.len(), "Run finished");
                Ok(RunReport { outcome, trace })
            }
            Err(e) => {
                error!(session = %session.id, error = %error_chain(&e), "Run aborted");
                Err(e)
            }
        }
    }

    async fn drive(&self, session: &mut Session, query: &str) -> Result<RunOutcome, Error> {
        let system = system_prompt(&session.preferences());
        let mut current_query = query.to_string();

        while session.state.iteration < self.max_iterations {
            let iteration = session.state.iteration + 1;
            info!(session = %session.id, iteration, "Iteration started");

            let perception = self.perception.perceive(&system, &current_query).await?;

            let (intent, action) = match parse_intent(&perception.response) {
                Ok(intent) => {
                    debug!(intent = intent.kind(), tool = intent.tool_name(), "Decided");
                    let action = self.act(&intent).await?;
                    (intent, action)
                }
                Err(e) => {
                    warn!(error = %error_chain(&e), "Could not parse model decision");
                    (Intent::Unknown, ActionResult::error(e))
                }
            };
            info!(iteration, intent = intent.kind(), result = %action, "Action taken");

            let synthesis = self
                .perception
                .perceive(&system, &synthesis_prompt(&perception.response, &action.text))
                .await?;
            let kind = classify_response(&synthesis.response);
            debug!(iteration, %kind, "Synthesis classified");

            session.state.trace.push(IterationRecord {
                iteration,
                intent: intent.kind().to_string(),
                tool_name: intent.tool_name().to_string(),
                action_result: action.text,
                synthesis: synthesis.response.clone(),
                kind,
                finished_at: Utc::now(),
            });
            session.state.last_response = Some(synthesis.response.clone());

            if kind.is_terminal() {
                info!(iteration, %kind, "Agent determined completion");
                return Ok(RunOutcome::Completed {
                    kind,
                    response: synthesis.response,
                });
            }

            session.state.iteration += 1;
            current_query = follow_up_query(&current_query, &synthesis.response);
        }

        warn!(session = %session.id, cap = self.max_iterations, "Iteration cap reached without a final answer");
        Ok(RunOutcome::IterationCapReached {
            iterations: self.max_iterations,
            last_response: session.state.last_response.clone(),
        })
    }

    /// Run the action; tool and transport failures become `[Error]` results.
    async fn act(&self, intent: &Intent) -> Result<ActionResult, Error> {
        match self.actions.execute(intent).await {
            Ok(result) => Ok(result),
            Err(e @ (Error::Tool(_) | Error::Protocol(_))) => {
                warn!(tool = intent.tool_name(), error = %error_chain(&e), "Tool invocation failed");
                Ok(ActionResult::error(e))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedInvoker, SequentialMockProvider};
    use serde_json::Map;
    use stockpilot_config::WarehouseProfile;
    use stockpilot_core::error::{ProtocolError, ProviderError, ToolError};

    const KPI_CALL: &str = r#"FUNCTION_CALL: {"name": "suggest_kpis", "arguments": {}}"#;

    fn agent(
        provider: &Arc<SequentialMockProvider>,
        invoker: &Arc<ScriptedInvoker>,
    ) -> AgentLoop {
        AgentLoop::new(provider.clone(), "mock-model", invoker.clone())
    }

    #[tokio::test]
    async fn kpi_query_ends_with_final_answer() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            KPI_CALL,
            "My recommendation: track OTIF, fill rate and dock-to-stock time.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&["1. OTIF\n2. Fill rate"]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .run(&mut session, "What KPIs should I track?")
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            RunOutcome::Completed {
                kind: ResponseKind::FinalAnswer,
                response: "My recommendation: track OTIF, fill rate and dock-to-stock time.".into(),
            }
        );
        assert_eq!(invoker.calls(), vec![("suggest_kpis".to_string(), Map::new())]);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].ends_with("Logistics Query: What KPIs should I track?"));
        assert!(prompts[1].contains("[MCP Response] 1. OTIF\n2. Fill rate"));
        assert!(prompts[1].contains(KPI_CALL));

        assert_eq!(report.trace.len(), 1);
        assert_eq!(report.trace[0].tool_name, "suggest_kpis");
        assert!(session.state.is_clean());
    }

    #[tokio::test]
    async fn endless_tool_calls_stop_at_the_cap() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            KPI_CALL,
            "Calling another tool.",
            KPI_CALL,
            "Calling another tool.",
            KPI_CALL,
            "Calling another tool.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&["a", "b", "c"]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .run(&mut session, "Help")
            .await
            .unwrap();

        assert!(matches!(
            report.outcome,
            RunOutcome::IterationCapReached { iterations: 3, .. }
        ));
        assert!(report.final_message().is_none());
        assert_eq!(provider.call_count(), 6);
        assert_eq!(invoker.calls().len(), 3);
        assert_eq!(report.trace.len(), 3);

        let third = &provider.prompts()[4];
        assert_eq!(third.matches("What should I do next?").count(), 2);
        assert!(session.state.is_clean());
    }

    #[tokio::test]
    async fn complete_run_synthesis_ends_the_run() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "COMPLETE_RUN",
            "Logistics task finished.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .run(&mut session, "Thanks, that's all")
            .await
            .unwrap();

        assert!(matches!(
            report.outcome,
            RunOutcome::Completed {
                kind: ResponseKind::CompleteRun,
                ..
            }
        ));
        assert!(provider.prompts()[1].contains("[Unverified] "));
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_call_becomes_error_result() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "FUNCTION_CALL: {not json",
            "Here is a summary of what went wrong.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .run(&mut session, "Reorder point for widgets?")
            .await
            .unwrap();

        assert!(report.final_message().is_some());
        assert!(provider.prompts()[1].contains("[Error] FUNCTION_CALL payload is not valid JSON"));
        assert!(invoker.calls().is_empty());
        assert_eq!(report.trace[0].intent, "unknown");
    }

    #[tokio::test]
    async fn tool_failures_do_not_abort() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            KPI_CALL,
            "Still thinking.",
            KPI_CALL,
            "Final answer: OTIF.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::new(vec![
            Err(ToolError::Remote {
                tool_name: "suggest_kpis".into(),
                reason: "model quota exhausted".into(),
            }
            .into()),
            Err(ProtocolError::Closed.into()),
        ]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .run(&mut session, "KPIs?")
            .await
            .unwrap();

        let prompts = provider.prompts();
        assert!(prompts[1].contains("[Error] Tool error: Remote tool call failed"));
        assert!(prompts[3].contains("[Error] Protocol error: Tool server closed the connection"));
        assert_eq!(report.final_message(), Some("Final answer: OTIF."));
    }

    #[tokio::test]
    async fn unknown_intent_is_reported_to_synthesis() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Let me think about that.",
            "My answer: stagger dock appointments.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let mut session = Session::new();

        agent(&provider, &invoker).run(&mut session, "Dock congestion?").await.unwrap();
        assert!(provider.prompts()[1].contains("[Error] Unknown action."));
    }

    #[tokio::test]
    async fn provider_failure_aborts_and_resets_state() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            Ok(KPI_CALL.into()),
            Err(ProviderError::RateLimited),
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&["kpis"]));
        let mut session = Session::new();
        session.set_profile(&WarehouseProfile::default());

        let err = agent(&provider, &invoker)
            .run(&mut session, "KPIs?")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider(ProviderError::RateLimited)));
        assert!(session.state.is_clean());
        assert_eq!(session.memory.len(), 1);
    }

    #[tokio::test]
    async fn padded_model_output_is_trimmed_everywhere() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "  FINAL_ANSWER: x  \n",
            "\n\n  My recommendation: OTIF.  \n\n",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker).run(&mut session, "KPIs?").await.unwrap();

        assert_eq!(report.final_message(), Some("My recommendation: OTIF."));
        assert_eq!(report.trace[0].synthesis, "My recommendation: OTIF.");
        assert!(provider.prompts()[1].contains("perceived:\nFINAL_ANSWER: x\n"));
    }

    #[tokio::test]
    async fn system_prompt_comes_from_session_profile() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "FINAL_ANSWER: Use wave picking",
            "Recommendation: wave picking.",
        ]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let mut session = Session::new();
        session.set_profile(&WarehouseProfile {
            location: Some("Rotterdam".into()),
            shipment_volume: Some("1200".into()),
            automation_level: Some("high".into()),
        });

        agent(&provider, &invoker).run(&mut session, "Picking?").await.unwrap();

        let prompts = provider.prompts();
        assert!(prompts[0].contains("Warehouse: Rotterdam"));
        assert!(prompts[0].contains("Automation: high"));
        assert!(prompts[1].contains("[Unverified] Use wave picking"));
    }

    #[tokio::test]
    async fn single_iteration_cap() {
        let provider = Arc::new(SequentialMockProvider::texts(&[KPI_CALL, "hmm"]));
        let invoker = Arc::new(ScriptedInvoker::texts(&["x"]));
        let mut session = Session::new();

        let report = agent(&provider, &invoker)
            .with_max_iterations(1)
            .run(&mut session, "KPIs?")
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            RunOutcome::IterationCapReached {
                iterations: 1,
                last_response: Some("hmm".into()),
            }
        );
    }

    #[test]
    fn from_config_reads_agent_section() {
        let mut config = AppConfig::default();
        config.agent.max_iterations = 5;
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let invoker = Arc::new(ScriptedInvoker::texts(&[]));
        let agent = AgentLoop::from_config(&config, provider, invoker);
        assert_eq!(agent.max_iterations(), 5);
        assert_eq!(agent.perception.model(), "gemini-2.0-flash");
    }

    #[test]
    fn error_chain_includes_sources() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(stockpilot_core::error::DecisionError::MalformedPayload(parse));
        let chain = error_chain(&err);
        assert!(chain.starts_with("Decision error: FUNCTION_CALL payload is not valid JSON"));
        assert!(chain.matches("EOF").count() >= 1);
    }
}
