//! ReAct pattern: Thought → Action → Observation loop.
//!
//! Each iteration sends the question plus the transcript so far to the
//! model, parses the reply, and either stops with a final answer or
//! dispatches one tool and records what it returned. Output the loop
//! cannot act on is answered with a corrective observation so the model
//! can fix its format on the next turn.
//!
//! # Trace Format
//!
//! The transcript is replayed to the model as plain text:
//!
//! ```text
//! Thought: I should see what was uploaded.
//! Action: {"action_type":"list_materials","input":""}
//! Observation: - ID: 1a2b3c4d, Title: Biology, Words: 812
//!
//! Thought: (corrective turns have no Action line)
//! Observation: No valid action. Use Action or Final Answer.
//! ```
//!
//! The loop terminates on a final answer or when the iteration budget is
//! spent. A model call that fails ends the run with the provider error.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use studybuddy_core::error::ProviderError;
use studybuddy_core::event::{DomainEvent, EventBus};
use studybuddy_core::tool::{ToolRegistry, truncate_observation};
use tracing::{debug, info, warn};

use crate::model::ModelGateway;
use crate::parser::{ParsedAction, ParsedStep, parse_response};
use crate::prompt::build_system_prompt;

pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Characters of a tool result kept in the transcript.
pub const DEFAULT_OBSERVATION_LIMIT: usize = 3000;

/// Characters of each observation kept in the returned thought process.
pub const DEFAULT_PREVIEW_LIMIT: usize = 500;

pub const FALLBACK_ANSWER: &str =
    "I couldn't complete the task. Please try a more specific question.";

pub const MALFORMED_ACTION_OBSERVATION: &str = "Error parsing action JSON. Use exact format.";

pub const NO_ACTION_OBSERVATION: &str = "No valid action. Use Action or Final Answer.";

/// Where a run is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Iterations completed so far.
    Running(u32),
    Answered(String),
    Exhausted,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    Exhausted,
}

/// One completed iteration.
///
/// Corrective entries, recorded when the model's output could not be acted
/// upon, have no action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub thought: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,
    pub observation: String,
}

impl TranscriptEntry {
    fn tool(thought: String, action_id: String, action_input: String, observation: String) -> Self {
        Self {
            thought,
            action_id: Some(action_id),
            action_input: Some(action_input),
            observation,
        }
    }

    fn corrective(thought: String, observation: &str) -> Self {
        Self {
            thought,
            action_id: None,
            action_input: None,
            observation: observation.to_string(),
        }
    }

    /// Render the entry the way it is replayed to the model.
    pub fn render(&self) -> String {
        match (&self.action_id, &self.action_input) {
            (Some(id), Some(input)) => {
                let action = serde_json::json!({ "action_type": id, "input": input });
                format!(
                    "Thought: {}\nAction: {}\nObservation: {}\n\n",
                    self.thought, action, self.observation
                )
            }
            _ => format!("Thought: {}\nObservation: {}\n\n", self.thought, self.observation),
        }
    }

    fn preview(&self, limit: usize) -> Self {
        let observation = match self.observation.char_indices().nth(limit) {
            Some((cut, _)) => self.observation[..cut].to_string(),
            None => self.observation.clone(),
        };
        Self {
            observation,
            ..self.clone()
        }
    }
}

/// The result of a ReAct execution.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    /// Completed iterations, observations cut to the preview limit.
    pub thought_process: Vec<TranscriptEntry>,
    pub final_answer: String,
    pub outcome: Outcome,
    /// Model calls made.
    pub iterations: u32,
}

/// A ReAct agent over a fixed tool registry.
///
/// `run` borrows the agent immutably, so one agent can serve concurrent
/// runs; each run owns its transcript.
pub struct ReactAgent {
    gateway: ModelGateway,
    tools: Arc<ToolRegistry>,
    preamble: Option<String>,
    prompt_date: NaiveDate,
    system_prompt: String,
    max_iterations: u32,
    observation_limit: usize,
    preview_limit: usize,
    event_bus: Arc<EventBus>,
}

impl ReactAgent {
    /// Create a new ReAct agent. The system prompt is built here, dated today.
    pub fn new(gateway: ModelGateway, tools: Arc<ToolRegistry>) -> Self {
        let prompt_date = Local::now().date_naive();
        let system_prompt = build_system_prompt(None, &tools, prompt_date);
        Self {
            gateway,
            tools,
            preamble: None,
            prompt_date,
            system_prompt,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            observation_limit: DEFAULT_OBSERVATION_LIMIT,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Replace the default role preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self.rebuild_prompt();
        self
    }

    /// Date the prompt with a fixed day instead of today.
    pub fn with_prompt_date(mut self, date: NaiveDate) -> Self {
        self.prompt_date = date;
        self.rebuild_prompt();
        self
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_observation_limit(mut self, limit: usize) -> Self {
        self.observation_limit = limit;
        self
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// Publish loop events on a shared bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    fn rebuild_prompt(&mut self) {
        self.system_prompt =
            build_system_prompt(self.preamble.as_deref(), &self.tools, self.prompt_date);
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Execute the ReAct loop for one question.
    pub async fn run(&self, query: &str) -> Result<AgentResult, ProviderError> {
        let mut transcript: Vec<TranscriptEntry> = Vec::new();
        let mut history = String::new();
        let mut state = LoopState::Running(0);
        let mut iterations = 0u32;

        info!(model = %self.gateway.model(), max_iter = self.max_iterations, "ReAct loop starting");

        while let LoopState::Running(completed) = state {
            if completed >= self.max_iterations {
                state = LoopState::Exhausted;
                break;
            }
            iterations = completed + 1;
            debug!(iteration = iterations, "ReAct iteration");

            let prompt = format!("Question: {query}\n\n{history}Continue:\n");

            let llm_start = Instant::now();
            let response = self
                .gateway
                .generate(&self.system_prompt, &prompt)
                .await
                .inspect_err(|e| warn!(iteration = iterations, error = %e, "Model call failed"))?;

            self.event_bus.publish(DomainEvent::ResponseGenerated {
                model: response.model.clone(),
                iteration: iterations as usize,
                tokens_used: response.usage.as_ref().map(|u| u.total_tokens),
                duration_ms: llm_start.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
            });

            let entry = match parse_response(&response.message.content) {
                Ok(ParsedStep {
                    action: ParsedAction::FinalAnswer { text },
                    ..
                }) => {
                    state = LoopState::Answered(text);
                    continue;
                }
                Ok(ParsedStep {
                    thought,
                    action: ParsedAction::ToolCall { action_id, input },
                }) => {
                    let observation = self.dispatch(&action_id, &input).await;
                    TranscriptEntry::tool(thought, action_id, input, observation)
                }
                Ok(ParsedStep {
                    thought,
                    action: ParsedAction::Incomplete,
                }) => {
                    self.reject(iterations, "no Action or Final Answer");
                    TranscriptEntry::corrective(thought, NO_ACTION_OBSERVATION)
                }
                Err(e) => {
                    self.reject(iterations, &e.to_string());
                    TranscriptEntry::corrective(e.thought, MALFORMED_ACTION_OBSERVATION)
                }
            };

            history.push_str(&entry.render());
            transcript.push(entry);
            state = LoopState::Running(iterations);
        }

        let (final_answer, outcome) = match state {
            LoopState::Answered(text) => (text, Outcome::Answered),
            _ => {
                warn!("ReAct: max iterations reached ({})", self.max_iterations);
                (FALLBACK_ANSWER.to_string(), Outcome::Exhausted)
            }
        };

        self.event_bus.publish(DomainEvent::RunFinished {
            answered: outcome == Outcome::Answered,
            iterations: iterations as usize,
            timestamp: Utc::now(),
        });

        info!(iterations, steps = transcript.len(), ?outcome, "ReAct loop completed");

        Ok(AgentResult {
            thought_process: transcript
                .iter()
                .map(|entry| entry.preview(self.preview_limit))
                .collect(),
            final_answer,
            outcome,
            iterations,
        })
    }

    /// Run one tool. Failures, unknown tools included, become `Error:` observations.
    async fn dispatch(&self, action_id: &str, input: &str) -> String {
        debug!(tool = %action_id, input = %input, "Dispatching tool");

        let start = Instant::now();
        let result = self.tools.dispatch(action_id, input).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let success = result.is_ok();
        let observation = result.unwrap_or_else(|e| {
            warn!(tool = %action_id, error = %e, "Tool dispatch failed");
            format!("Error: {e}")
        });

        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: action_id.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });

        truncate_observation(observation, self.observation_limit)
    }

    fn reject(&self, iteration: u32, reason: &str) {
        warn!(iteration, reason, "Model output not actionable");
        self.event_bus.publish(DomainEvent::ActionRejected {
            iteration: iteration as usize,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }
}
