//! End-to-end tests for the Stockpilot agent.
//!
//! The agent loop talks to a real tool server hosting the default catalog.
//! Each tool call runs a full MCP session (initialize, then tools/call) over
//! in-memory pipes, and both the agent and the tool server use scripted
//! models.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rmcp::ServiceExt;
use serde_json::{Map, Value, json};
use stockpilot_agent::{AgentLoop, ResponseKind, RunOutcome, Session};
use stockpilot_config::WarehouseProfile;
use stockpilot_core::error::{Error, ProviderError};
use stockpilot_core::message::Message;
use stockpilot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use stockpilot_core::tool::ToolInvoker;
use stockpilot_mcp::{McpServer, call_tool_once};
use stockpilot_tools::default_registry;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt);
            prompts.len()
        };

        let Some(next) = self.responses.lock().unwrap().pop_front() else {
            panic!("ScriptedProvider exhausted at call #{call}");
        };
        Ok(ProviderResponse {
            message: Message::assistant(next?),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }
}

// ── In-process tool server ───────────────────────────────────────────────

/// Runs one MCP session per call against a shared server, like the stdio
/// invoker does with a fresh process.
struct InProcessInvoker {
    server: McpServer,
}

impl InProcessInvoker {
    fn new(tool_model: Arc<ScriptedProvider>) -> Self {
        let registry = default_registry(tool_model, "tool-model", None);
        Self {
            server: McpServer::new("Logistics MCP", registry),
        }
    }
}

/// Serve `server` on one end of an in-memory pipe and return the other.
fn connect(server: McpServer) -> tokio::io::DuplexStream {
    let (client_end, server_end) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_end).await {
            let _ = running.waiting().await;
        }
    });
    client_end
}

#[async_trait::async_trait]
impl ToolInvoker for InProcessInvoker {
    async fn invoke(&self, tool_name: &str, arguments: Map<String, Value>) -> Result<String, Error> {
        call_tool_once(connect(self.server.clone()), tool_name, arguments).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

const KPI_CALL: &str = r#"FUNCTION_CALL: {"name": "suggest_kpis", "arguments": {}}"#;

struct Harness {
    agent_model: Arc<ScriptedProvider>,
    tool_model: Arc<ScriptedProvider>,
    agent: AgentLoop,
}

fn harness(agent_script: &[&str], tool_script: Vec<Result<String, ProviderError>>) -> Harness {
    let agent_model = Arc::new(ScriptedProvider::texts(agent_script));
    let tool_model = Arc::new(ScriptedProvider::new(tool_script));
    let invoker = Arc::new(InProcessInvoker::new(tool_model.clone()));
    let agent = AgentLoop::new(agent_model.clone(), "agent-model", invoker);
    Harness {
        agent_model,
        tool_model,
        agent,
    }
}

fn rotterdam() -> Session {
    let mut session = Session::new();
    session.set_profile(&WarehouseProfile {
        location: Some("Rotterdam".into()),
        shipment_volume: Some("1200".into()),
        automation_level: Some("semi-automated".into()),
    });
    session
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn kpi_question_runs_through_the_tool_server() {
    let h = harness(
        &[
            KPI_CALL,
            "My recommendation: track OTIF, fill rate and dock-to-stock time.",
        ],
        vec![Ok("  1. OTIF\n2. Fill rate\n".into())],
    );
    let mut session = rotterdam();

    let report = h
        .agent
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

    // The tool server asked its model for step-by-step reasoning over the template
    let tool_prompts = h.tool_model.prompts();
    assert_eq!(tool_prompts.len(), 1);
    assert_eq!(
        tool_prompts[0],
        "Please explain step-by-step how you arrived at the following conclusion: \
         Suggest 5 key performance indicators (KPIs) for warehouse and logistics operations."
    );

    // The trimmed tool text reached the synthesis prompt
    let agent_prompts = h.agent_model.prompts();
    assert_eq!(agent_prompts.len(), 2);
    assert!(agent_prompts[0].contains("Warehouse: Rotterdam"));
    assert!(agent_prompts[0].ends_with("Logistics Query: What KPIs should I track?"));
    assert!(agent_prompts[1].contains("[MCP Response] 1. OTIF\n2. Fill rate\n"));

    assert_eq!(report.trace.len(), 1);
    assert_eq!(report.trace[0].tool_name, "suggest_kpis");
    assert!(session.state.is_clean());
}

#[tokio::test]
async fn typed_arguments_are_rendered_into_the_tool_prompt() {
    let h = harness(
        &[
            r#"```json
FUNCTION_CALL: {"name": "reorder_threshold", "arguments": {"product": "widget-A", "daily_usage": 50, "lead_time_days": 3}}
```"#,
            "Summary: reorder widget-A at 150 units.",
        ],
        vec![Ok("Reorder at 150 units.".into())],
    );
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "When do I reorder widgets?").await.unwrap();

    assert_eq!(report.final_message(), Some("Summary: reorder widget-A at 150 units."));
    assert!(h.tool_model.prompts()[0].contains(
        "Determine the reorder threshold for widget-A given a daily usage of 50 units and lead time of 3 days."
    ));
    assert!(h.agent_model.prompts()[1].contains("[MCP Response] Reorder at 150 units."));
}

#[tokio::test]
async fn endless_tool_calls_stop_at_the_iteration_cap() {
    let h = harness(
        &[
            KPI_CALL,
            "Calling another tool.",
            KPI_CALL,
            "Calling another tool.",
            KPI_CALL,
            "Calling another tool.",
        ],
        vec![Ok("a".into()), Ok("b".into()), Ok("c".into())],
    );
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "Help").await.unwrap();

    match &report.outcome {
        RunOutcome::IterationCapReached {
            iterations,
            last_response,
        } => {
            assert_eq!(*iterations, 3);
            assert_eq!(last_response.as_deref(), Some("Calling another tool."));
        }
        other => panic!("expected the cap, got {other:?}"),
    }
    assert!(report.final_message().is_none());
    assert_eq!(h.agent_model.calls(), 6);
    assert_eq!(h.tool_model.calls(), 3);
    assert!(session.state.is_clean());
}

#[tokio::test]
async fn invalid_arguments_come_back_as_error_results() {
    let h = harness(
        &[
            r#"FUNCTION_CALL: {"name": "reorder_threshold", "arguments": {"product": "widget-A"}}"#,
            "Final answer: I need the daily usage and lead time.",
        ],
        vec![],
    );
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "Reorder point?").await.unwrap();

    assert_eq!(h.tool_model.calls(), 0);
    let synthesis = &h.agent_model.prompts()[1];
    assert!(synthesis.contains("[Error] Tool error: Remote tool call failed: reorder_threshold"));
    assert!(synthesis.contains("daily_usage"));
    assert!(report.trace[0].action_result.starts_with("[Error]"));
    assert!(report.final_message().is_some());
}

#[tokio::test]
async fn unknown_tool_does_not_abort_the_run() {
    let h = harness(
        &[
            r#"FUNCTION_CALL: {"name": "launch_drones", "arguments": {}}"#,
            "My answer: that tool is not available, use cycle counting instead.",
        ],
        vec![],
    );
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "Count stock").await.unwrap();

    assert!(h.agent_model.prompts()[1].contains("[Error] Tool error: Remote tool call failed: launch_drones"));
    assert!(matches!(
        report.outcome,
        RunOutcome::Completed {
            kind: ResponseKind::FinalAnswer,
            ..
        }
    ));
}

#[tokio::test]
async fn tool_model_failure_is_reported_and_the_loop_recovers() {
    let h = harness(
        &[
            KPI_CALL,
            "Still thinking.",
            "FINAL_ANSWER: Track OTIF.",
            "Final answer: track OTIF.",
        ],
        vec![Err(ProviderError::RateLimited)],
    );
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "KPIs?").await.unwrap();

    let prompts = h.agent_model.prompts();
    assert!(prompts[1].contains("[Error] Tool error: Remote tool call failed: suggest_kpis"));
    // Second iteration carries the inconclusive synthesis forward
    assert!(prompts[2].contains("KPIs?\n\nStill thinking.\nWhat should I do next?"));
    assert!(prompts[3].contains("[Unverified] Track OTIF."));
    assert_eq!(report.final_message(), Some("Final answer: track OTIF."));
    assert_eq!(report.trace.len(), 2);
}

#[tokio::test]
async fn complete_run_needs_no_tool_server() {
    let h = harness(&["COMPLETE_RUN", "Logistics task finished."], vec![]);
    let mut session = rotterdam();

    let report = h.agent.run(&mut session, "That's all, thanks").await.unwrap();

    assert!(matches!(
        report.outcome,
        RunOutcome::Completed {
            kind: ResponseKind::CompleteRun,
            ..
        }
    ));
    assert_eq!(h.tool_model.calls(), 0);
}

#[tokio::test]
async fn session_profile_survives_consecutive_runs() {
    let h = harness(
        &[
            "FINAL_ANSWER: Use wave picking",
            "Recommendation: wave picking.",
            "FINAL_ANSWER: Add a second shift",
            "Recommendation: a second dock shift.",
        ],
        vec![],
    );
    let mut session = rotterdam();

    h.agent.run(&mut session, "Picking?").await.unwrap();
    h.agent.run(&mut session, "Dock congestion?").await.unwrap();

    let prompts = h.agent_model.prompts();
    assert!(prompts[2].contains("Warehouse: Rotterdam"));
    assert!(prompts[2].ends_with("Logistics Query: Dock congestion?"));
    assert!(!prompts[2].contains("Picking?"));
    assert_eq!(session.preferences()["shipment_volume"], json!("1200"));
}

#[tokio::test]
async fn tool_server_advertises_the_full_catalog() {
    let tool_model = Arc::new(ScriptedProvider::texts(&[]));
    let server = McpServer::new("Logistics MCP", default_registry(tool_model, "tool-model", None));

    let client = ().serve(connect(server)).await.unwrap();
    let info = client.peer_info().unwrap();
    assert_eq!(info.server_info.name, "Logistics MCP");

    let tools = client.list_all_tools().await.unwrap();
    assert_eq!(tools.len(), stockpilot_tools::CATALOG.len());
    let reorder = tools.iter().find(|t| t.name == "reorder_threshold").unwrap();
    assert_eq!(reorder.input_schema["properties"]["daily_usage"]["type"], "integer");

    client.cancel().await.unwrap();
}
