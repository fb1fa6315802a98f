//! The StudyBuddy session: a ReAct agent with the study tools and role.
//!
//! There is no process-wide agent. Front ends build one [`StudyBuddy`] and
//! share it (`Arc`) with whatever serves requests.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studybuddy_config::AgentConfig;
use studybuddy_core::error::{ProviderError, ToolError};
use studybuddy_core::event::EventBus;
use studybuddy_core::material::MaterialStore;
use studybuddy_tools::studybuddy_registry;
use tracing::{info, warn};

use crate::model::ModelGateway;
use crate::react::{AgentResult, ReactAgent};

pub const STUDYBUDDY_SYSTEM_PROMPT: &str = "You are StudyBuddy, an intelligent AI study assistant.

Your capabilities:
1. Q&A: Answer questions based on uploaded study materials
2. Study Plans: Create structured study schedules
3. Cheat Sheets: Summarize key concepts
4. Quizzes: Generate practice questions

Guidelines:
- Use list_materials to see available content
- Use search_material or retrieve_material to get content
- Use generate_study_plan, generate_cheatsheet, or generate_quiz as needed
- Always base answers on the uploaded materials
- Be helpful and encouraging";

/// What kind of reply a chat message asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Answer,
    Quiz,
    StudyPlan,
    Cheatsheet,
    Error,
}

impl ResponseType {
    /// Classify a user message by keyword. First matching group wins.
    pub fn detect(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has_any(&["quiz", "test me", "question"]) {
            Self::Quiz
        } else if has_any(&["study plan", "schedule", "exam"]) {
            Self::StudyPlan
        } else if has_any(&["cheat sheet", "summary", "key points"]) {
            Self::Cheatsheet
        } else {
            Self::Answer
        }
    }
}

/// The reply to one chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub final_answer: String,
    #[serde(default)]
    pub payload: String,
}

/// A StudyBuddy session over one material store.
pub struct StudyBuddy {
    agent: ReactAgent,
    store: Arc<dyn MaterialStore>,
}

impl StudyBuddy {
    /// A session with the built-in role and defaults.
    pub fn new(gateway: ModelGateway, store: Arc<dyn MaterialStore>) -> Result<Self, ToolError> {
        Self::from_config(gateway, store, &AgentConfig::default())
    }

    /// A session using the loop limits and optional role override from config.
    pub fn from_config(
        gateway: ModelGateway,
        store: Arc<dyn MaterialStore>,
        config: &AgentConfig,
    ) -> Result<Self, ToolError> {
        let registry = studybuddy_registry(store.clone())?;
        let preamble = config
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| STUDYBUDDY_SYSTEM_PROMPT.to_string());

        let agent = ReactAgent::new(gateway, Arc::new(registry))
            .with_preamble(preamble)
            .with_max_iterations(config.max_iterations)
            .with_observation_limit(config.observation_limit)
            .with_preview_limit(config.preview_limit);

        Ok(Self { agent, store })
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.agent = self.agent.with_event_bus(event_bus);
        self
    }

    pub fn agent(&self) -> &ReactAgent {
        &self.agent
    }

    pub fn store(&self) -> &Arc<dyn MaterialStore> {
        &self.store
    }

    /// Run the loop and return the full result, thought process included.
    pub async fn run(
        &self,
        message: &str,
        material_ids: &[String],
    ) -> Result<AgentResult, ProviderError> {
        let query = focus_query(message, material_ids);
        self.agent.run(&query).await
    }

    /// Answer one chat message. Model failures become an `error` reply.
    pub async fn chat(&self, message: &str, material_ids: &[String]) -> ChatReply {
        info!(focus = material_ids.len(), "StudyBuddy chat");
        match self.run(message, material_ids).await {
            Ok(result) => ChatReply {
                kind: ResponseType::detect(message),
                final_answer: result.final_answer,
                payload: String::new(),
            },
            Err(e) => {
                warn!(error = %e, "StudyBuddy chat failed");
                ChatReply {
                    kind: ResponseType::Error,
                    final_answer: format!("Error: {e}"),
                    payload: String::new(),
                }
            }
        }
    }
}

/// Append the focus hint when the caller pinned specific materials.
fn focus_query(message: &str, material_ids: &[String]) -> String {
    if material_ids.is_empty() {
        message.to_string()
    } else {
        format!("{message}\n\n[Focus on materials: {}]", material_ids.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, SequentialMockProvider};
    use studybuddy_store::{InMemoryStore, material_from_text};

    fn store() -> Arc<dyn MaterialStore> {
        Arc::new(InMemoryStore::new())
    }

    #[test]
    fn detects_response_type() {
        assert_eq!(ResponseType::detect("Quiz me on cells"), ResponseType::Quiz);
        assert_eq!(ResponseType::detect("Can you TEST ME?"), ResponseType::Quiz);
        assert_eq!(ResponseType::detect("Make a study plan"), ResponseType::StudyPlan);
        assert_eq!(ResponseType::detect("My exam is friday"), ResponseType::StudyPlan);
        assert_eq!(ResponseType::detect("Give me a cheat sheet"), ResponseType::Cheatsheet);
        assert_eq!(ResponseType::detect("key points please"), ResponseType::Cheatsheet);
        assert_eq!(ResponseType::detect("What is osmosis?"), ResponseType::Answer);
        // Quiz keywords take precedence
        assert_eq!(ResponseType::detect("exam question summary"), ResponseType::Quiz);
    }

    #[test]
    fn reply_serializes_type_field() {
        let reply = ChatReply {
            kind: ResponseType::StudyPlan,
            final_answer: "Day 1".into(),
            payload: String::new(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "study_plan");
        assert_eq!(json["payload"], "");
    }

    #[test]
    fn focus_hint() {
        assert_eq!(focus_query("Explain", &[]), "Explain");
        assert_eq!(
            focus_query("Explain", &["a1".to_string(), "b2".to_string()]),
            "Explain\n\n[Focus on materials: a1, b2]"
        );
    }

    #[tokio::test]
    async fn chat_answers_with_type() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Final Answer: Q1. What is ATP?"]));
        let session = StudyBuddy::new(ModelGateway::new(provider.clone(), "m"), store()).unwrap();

        let reply = session
            .chat("Quiz me please", &["abc".to_string()])
            .await;
        assert_eq!(reply.kind, ResponseType::Quiz);
        assert_eq!(reply.final_answer, "Q1. What is ATP?");
        assert_eq!(reply.payload, "");
        assert_eq!(
            provider.user_prompts()[0],
            "Question: Quiz me please\n\n[Focus on materials: abc]\n\nContinue:\n"
        );
    }

    #[tokio::test]
    async fn chat_uses_the_study_tools() {
        let store = store();
        let id = store
            .store(material_from_text("Osmosis moves water", "Biology"))
            .await
            .unwrap();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Thought: check\nAction: {\"action_type\": \"list_materials\", \"input\": \"\"}",
            "Final Answer: You have Biology.",
        ]));
        let session = StudyBuddy::new(ModelGateway::new(provider, "m"), store).unwrap();

        let result = session.run("What did I upload?", &[]).await.unwrap();
        assert_eq!(result.final_answer, "You have Biology.");
        assert_eq!(
            result.thought_process[0].observation,
            format!("- ID: {id}, Title: Biology, Words: 3")
        );
    }

    #[tokio::test]
    async fn gateway_failure_becomes_error_reply() {
        let session =
            StudyBuddy::new(ModelGateway::new(Arc::new(FailingProvider), "m"), store()).unwrap();

        let reply = session.chat("Make a study plan", &[]).await;
        assert_eq!(reply.kind, ResponseType::Error);
        assert_eq!(reply.final_answer, "Error: Authentication failed: invalid key");
    }

    #[test]
    fn session_prompt_and_limits() {
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let session = StudyBuddy::new(ModelGateway::new(provider, "m"), store()).unwrap();
        let prompt = session.agent().system_prompt();

        assert!(prompt.starts_with("You are StudyBuddy, an intelligent AI study assistant."));
        assert!(prompt.contains("You have access to these tools: list_materials, retrieve_material, search_material, generate_quiz, generate_study_plan, generate_cheatsheet"));
        assert_eq!(session.agent().max_iterations(), 15);
    }

    #[test]
    fn config_override_replaces_role() {
        let config = AgentConfig {
            max_iterations: 3,
            system_prompt_override: Some("You are a strict tutor.".into()),
            ..AgentConfig::default()
        };
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let session =
            StudyBuddy::from_config(ModelGateway::new(provider, "m"), store(), &config).unwrap();

        assert!(session.agent().system_prompt().starts_with("You are a strict tutor."));
        assert_eq!(session.agent().max_iterations(), 3);
    }
}
