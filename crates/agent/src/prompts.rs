//! Prompt construction: the system prompt and the synthesis prompt.

use serde_json::Value;
use stockpilot_tools::catalog::{Category, by_category};

/// Memory key holding the warehouse profile.
pub const PREFERENCES_KEY: &str = "user_preferences";

/// Render a profile field, `unknown` when absent or null.
fn field(preferences: &Value, key: &str) -> String {
    match preferences.get(key) {
        None | Some(Value::Null) => "unknown".into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn tool_list() -> String {
    let mut out = String::new();
    for category in Category::ALL {
        out.push_str(category.heading());
        out.push_str(":\n");
        for spec in by_category(category) {
            out.push_str("- ");
            out.push_str(&spec.signature());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// The agent's system prompt for a warehouse profile.
///
/// `preferences` is the object stored under [`PREFERENCES_KEY`] with the
/// keys `warehouse_location`, `shipment_volume` and `automation_level`.
pub fn system_prompt(preferences: &Value) -> String {
    format!(
        r#"You are a logistics and warehouse automation agent specialized in supply chain optimization, inventory control, and efficiency strategies.

Warehouse: {location}
Daily Shipments: {volume}
Automation: {automation}

Respond using ONLY one of these formats:

FUNCTION_CALL: {{
  "name": "<tool_name>",
  "arguments": {{
    "param1": value1,
    "param2": value2
  }}
}}
FINAL_ANSWER: <string>
COMPLETE_RUN

You can suggest KPIs, route improvements, layout strategies, or take actions using the following tools:

{tools}Rules:
- All FUNCTION_CALLs MUST be valid JSON. Each must return an object with "name" and "arguments".
- If the response includes phrases like "need more information" or "cannot directly answer" or indicates missing input, respond with a new FUNCTION_CALL to request the required data using the tools listed.
- Do not generate explanations, summaries, or conclusions outside the FINAL_ANSWER or COMPLETE_RUN format.
- If a role like "forklift operator" or "warehouse manager" is mentioned, use employee_training_plan.

Additional Instructions:
- Self-Check: After selecting a tool or suggesting a strategy, verify that the input parameters are complete and reasonable. If not, respond with a FUNCTION_CALL to gather missing data.
- Reasoning Type: For each FUNCTION_CALL, pick the tool whose parameters you can fill completely. For example:
FUNCTION_CALL: {{
  "name": "reorder_threshold",
  "arguments": {{
    "product": "widget-A",
    "daily_usage": 50,
    "lead_time_days": 3
  }}
}}
- If unsure or conflicted between tools, prefer the one with more direct impact on efficiency.
"#,
        location = field(preferences, "warehouse_location"),
        volume = field(preferences, "shipment_volume"),
        automation = field(preferences, "automation_level"),
        tools = tool_list(),
    )
}

/// Prompt asking the model to combine a perception and an action result.
pub fn synthesis_prompt(perception: &str, action_result: &str) -> String {
    format!(
        "You are a cognitive agent that first perceives input and then takes an action based on the perception.

Here is what was perceived:
{perception}

Here is the action that was taken as a result:
{action_result}

Based on both the perception and the action result, synthesize a final answer that is helpful, complete, and user-facing. Do not repeat the steps. Provide a clear and final response."
    )
}

/// Query for the next iteration after an inconclusive synthesis.
pub fn follow_up_query(query: &str, response: &str) -> String {
    format!("{query}\n\n{response}\nWhat should I do next?")
}
