//! Model gateway: one system prompt and one user prompt in, the reply out.
//!
//! [`ModelGateway::generate`] is what the ReAct loop calls: it keeps the
//! responding model name and token usage for progress events.
//! [`ModelGateway::complete`] is the text-only form for callers that need
//! nothing else.
//!
//! The gateway never parses and never retries. A failure is returned to
//! the caller and ends the run.

use std::sync::Arc;
use studybuddy_config::AppConfig;
use studybuddy_core::error::ProviderError;
use studybuddy_core::message::Message;
use studybuddy_core::provider::{Provider, ProviderRequest, ProviderResponse};

/// A provider bound to a model and sampling settings.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Model, temperature and max tokens from the top-level config.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompts and return the full provider response, usage included.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system_prompt), Message::user(user_prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        self.provider.complete(request).await
    }

    /// Send the prompts and return only the generated text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        Ok(self.generate(system_prompt, user_prompt).await?.message.content)
    }
}
