//! System prompt construction.
//!
//! The prompt is a pure function of the role preamble, the registered tools
//! and the date, so it is built once when an agent is created.

use chrono::NaiveDate;
use studybuddy_core::tool::ToolRegistry;

/// Preamble used when the caller does not supply one.
pub const DEFAULT_PREAMBLE: &str = "You are an AI assistant that follows the ReAct pattern.";

/// Build the ReAct system prompt.
pub fn build_system_prompt(preamble: Option<&str>, tools: &ToolRegistry, today: NaiveDate) -> String {
    let preamble = preamble.unwrap_or(DEFAULT_PREAMBLE);
    let tool_names = tools.names().join(", ");
    let tool_usage = tools
        .iter()
        .map(|t| t.usage())
        .collect::<Vec<_>>()
        .join("\n\n");
    let date = today.format("%B %d, %Y");

    format!(
        r#"{preamble}

You have access to these tools: {tool_names}

{tool_usage}

IMPORTANT: Follow this EXACT format for every response.

When you need to use a tool:
Thought: [your reasoning]
Action: {{"action_type": "[tool_name]", "input": "[input_value]"}}

When you have the final answer (ONLY after gathering enough information):
Thought: I have enough information to answer.
Final Answer: [your complete answer]

Rules:
- Use ONE action at a time
- Wait for Observation before next step
- For simple queries, use retrieve_material first to get content, then give Final Answer
- Never write "Final Answer:" inside an Action
- Today's date is {date}
"#
    )
}
