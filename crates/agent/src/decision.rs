//! Decision: turn raw model text into a typed [`Intent`].
//!
//! The model is asked to answer with exactly one of
//! `FUNCTION_CALL: {json}`, `FINAL_ANSWER: <text>` or `COMPLETE_RUN`.
//! Code fences and literal `\n` escapes are stripped before matching.

use serde_json::{Map, Value};
use stockpilot_core::error::DecisionError;

const FUNCTION_CALL: &str = "FUNCTION_CALL:";
const FINAL_ANSWER: &str = "FINAL_ANSWER:";
const COMPLETE_RUN: &str = "COMPLETE_RUN";

/// What the model asked the agent to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    FunctionCall {
        tool_name: String,
        arguments: Map<String, Value>,
    },
    FinalAnswer {
        text: String,
    },
    CompleteRun,
    Unknown,
}

impl Intent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::FunctionCall { .. } => "function_call",
            Intent::FinalAnswer { .. } => "final_answer",
            Intent::CompleteRun => "complete_run",
            Intent::Unknown => "unknown",
        }
    }

    /// Tool name, empty unless this is a function call.
    pub fn tool_name(&self) -> &str {
        match self {
            Intent::FunctionCall { tool_name, .. } => tool_name,
            _ => "",
        }
    }
}

fn normalize(response: &str) -> String {
    response
        .trim()
        .replace("```json", "")
        .replace("```", "")
        .replace("\\n", "")
        .trim()
        .to_string()
}

/// Parse a model response.
///
/// Only a malformed `FUNCTION_CALL` payload is an error; text matching no
/// prefix is [`Intent::Unknown`].
pub fn parse_intent(response: &str) -> Result<Intent, DecisionError> {
    let text = normalize(response);

    if let Some(payload) = text.strip_prefix(FUNCTION_CALL) {
        return parse_function_call(payload.trim());
    }
    if let Some(answer) = text.strip_prefix(FINAL_ANSWER) {
        return Ok(Intent::FinalAnswer {
            text: answer.trim().to_string(),
        });
    }
    if text.starts_with(COMPLETE_RUN) {
        return Ok(Intent::CompleteRun);
    }
    Ok(Intent::Unknown)
}

fn parse_function_call(payload: &str) -> Result<Intent, DecisionError> {
    let value: Value = serde_json::from_str(payload).map_err(DecisionError::MalformedPayload)?;

    let name = value.get("name").ok_or(DecisionError::MissingField("name"))?;
    let tool_name = name.as_str().ok_or(DecisionError::WrongFieldType {
        field: "name",
        expected: "string",
    })?;

    let arguments = value
        .get("arguments")
        .ok_or(DecisionError::MissingField("arguments"))?;
    let arguments = arguments
        .as_object()
        .cloned()
        .ok_or(DecisionError::WrongFieldType {
            field: "arguments",
            expected: "object",
        })?;

    Ok(Intent::FunctionCall {
        tool_name: tool_name.to_string(),
        arguments,
    })
}
