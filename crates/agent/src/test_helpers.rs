//! Shared test helpers: scripted providers and tools.

use async_trait::async_trait;
use studybuddy_core::error::{ProviderError, ToolError};
use studybuddy_core::message::Message;
use studybuddy_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use studybuddy_core::tool::Tool;
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    call_count: Mutex<usize>,
    user_prompts: Mutex<Vec<String>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            user_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script the raw text of each model turn.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_text_response(t)).collect())
    }

    /// Return the same text `n` times.
    pub fn repeating(text: &str, n: usize) -> Self {
        Self::new(vec![make_text_response(text); n])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The last message of every request received, in order.
    pub fn user_prompts(&self) -> Vec<String> {
        self.user_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if let Some(last) = request.messages.last() {
            self.user_prompts.lock().unwrap().push(last.content.clone());
        }

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

/// Records every request and answers with a fixed text.
pub struct RecordingProvider {
    reply: String,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl RecordingProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        Ok(make_text_response(&self.reply))
    }
}

/// Always fails, like an endpoint with a bad key.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::AuthenticationFailed("invalid key".into()))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Inputs an [`EchoTool`] has received, readable after the tool is boxed.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Returns its input, prefixed, and logs every call.
pub struct EchoTool {
    pub name: &'static str,
    calls: CallLog,
}

impl EchoTool {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: CallLog::default(),
        }
    }

    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn usage(&self) -> &str {
        "### echo\nEchoes the input."
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(input.to_string());
        Ok(format!("echo: {input}"))
    }
}

/// Produces a fixed observation, however long.
pub struct FixedTool {
    pub name: &'static str,
    pub output: String,
}

#[async_trait]
impl Tool for FixedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn usage(&self) -> &str {
        "### fixed\nReturns a fixed text."
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Ok(self.output.clone())
    }
}

/// Always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn usage(&self) -> &str {
        "### broken\nAlways fails."
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "database locked".into(),
        })
    }
}
