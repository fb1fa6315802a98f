//! The StudyBuddy agent: a ReAct loop over the study tools.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Prompt** the model with the question and the transcript so far
//! 2. **Parse** its reply into a tool call, a final answer, or neither
//! 3. **Dispatch** the tool and append its observation to the transcript
//! 4. **Stop** on a final answer, or when the iteration budget is spent
//!
//! [`StudyBuddy`] wraps the loop with the study tools and role preamble.

pub mod model;
pub mod parser;
pub mod prompt;
pub mod react;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use model::ModelGateway;
pub use parser::{MalformedAction, ParsedAction, ParsedStep, parse_response};
pub use prompt::{DEFAULT_PREAMBLE, build_system_prompt};
pub use react::{AgentResult, LoopState, Outcome, ReactAgent, TranscriptEntry};
pub use session::{ChatReply, ResponseType, STUDYBUDDY_SYSTEM_PROMPT, StudyBuddy};
