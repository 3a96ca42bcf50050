//! Keyword classifier for synthesized responses.

use serde::Serialize;

/// How the loop should treat a synthesized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    FinalAnswer,
    CompleteRun,
    Unknown,
}

impl ResponseKind {
    /// Whether a response of this kind ends the run.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ResponseKind::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::FinalAnswer => "final_answer",
            ResponseKind::CompleteRun => "complete_run",
            ResponseKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const COMPLETION_CUES: &[&str] = &["task finished"];
const ANSWER_CUES: &[&str] = &["answer", "summary", "recommendation"];

/// Classify `text` by case-insensitive substring match.
///
/// Completion cues win over answer cues.
pub fn classify_response(text: &str) -> ResponseKind {
    let lower = text.to_lowercase();
    if COMPLETION_CUES.iter().any(|cue| lower.contains(cue)) {
        ResponseKind::CompleteRun
    } else if ANSWER_CUES.iter().any(|cue| lower.contains(cue)) {
        ResponseKind::FinalAnswer
    } else {
        ResponseKind::Unknown
    }
}
