//! Action parser: turns raw model text into one discriminated step.
//!
//! The model is asked to answer in one of two shapes:
//!
//! ```text
//! Thought: I should look at the materials.
//! Action: {"action_type": "list_materials", "input": ""}
//! ```
//!
//! ```text
//! Thought: I have enough information to answer.
//! Final Answer: Mitochondria produce ATP.
//! ```
//!
//! Models drift from the format, so the parser is tolerant: a `Final Answer:`
//! marker anywhere wins over an `Action:` block, a missing `Thought:` yields an
//! empty thought, and text with neither marker is [`ParsedAction::Incomplete`].
//! Only an `Action:` block whose JSON does not decode is an error.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const THOUGHT_MARKER: &str = "Thought:";
const ACTION_MARKER: &str = "Action:";
const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// `Action:` then a brace-delimited object, up to the first closing brace.
static ACTION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)Action:\s*(\{.*?\})").ok());

/// What the model asked for this iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAction {
    /// Invoke a tool with one string input.
    ToolCall { action_id: String, input: String },
    /// Stop and answer.
    FinalAnswer { text: String },
    /// Neither an action nor an answer.
    Incomplete,
}

/// One parsed model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    pub thought: String,
    pub action: ParsedAction,
}

/// An `Action:` block was present but its JSON did not decode.
#[derive(Debug, thiserror::Error)]
#[error("Error parsing action JSON: {source}")]
pub struct MalformedAction {
    /// The thought that preceded the broken action, kept for the transcript.
    pub thought: String,
    #[source]
    pub source: serde_json::Error,
}

/// Parse a raw model response.
pub fn parse_response(text: &str) -> Result<ParsedStep, MalformedAction> {
    let thought = extract_thought(text);

    if let Some(pos) = text.find(FINAL_ANSWER_MARKER) {
        let answer = text[pos + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        return Ok(ParsedStep {
            thought,
            action: ParsedAction::FinalAnswer { text: answer },
        });
    }

    let Some(json) = ACTION_RE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
    else {
        return Ok(ParsedStep {
            thought,
            action: ParsedAction::Incomplete,
        });
    };

    let fields: Map<String, Value> = match serde_json::from_str(json.as_str()) {
        Ok(fields) => fields,
        Err(source) => return Err(MalformedAction { thought, source }),
    };

    Ok(ParsedStep {
        thought,
        action: ParsedAction::ToolCall {
            action_id: field_as_string(&fields, "action_type"),
            input: field_as_string(&fields, "input"),
        },
    })
}

/// Text after `Thought:` up to the next `Action:` or `Final Answer:`.
fn extract_thought(text: &str) -> String {
    let Some(start) = text.find(THOUGHT_MARKER) else {
        return String::new();
    };
    let rest = &text[start + THOUGHT_MARKER.len()..];
    let end = [ACTION_MARKER, FINAL_ANSWER_MARKER]
        .iter()
        .filter_map(|marker| rest.find(marker))
        .min()
        .unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

/// Strings are taken verbatim, absent keys and `null` become empty, and
/// anything else is rendered as compact JSON.
fn field_as_string(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
