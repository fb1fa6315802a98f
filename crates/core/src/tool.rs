//! Tool trait: the abstraction over agent capabilities.
//!
//! A tool is identified by a string, takes one string input and produces
//! one string observation. Tools are registered in a [`ToolRegistry`]
//! which keeps them in registration order so the system prompt lists them
//! deterministically.

use async_trait::async_trait;
use std::collections::HashMap;
use crate::error::ToolError;

/// Marker appended to observations cut at the observation limit.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// The core Tool trait.
///
/// Each StudyBuddy capability (list_materials, search_material, ...)
/// implements this trait. Implementations must be safe to call from many
/// concurrent runs at once.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique identifier of this tool (e.g., "list_materials").
    fn name(&self) -> &str;

    /// Usage text shown to the model: what the tool does, its input and output.
    fn usage(&self) -> &str;

    /// Execute the tool with the given input.
    async fn execute(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools.
///
/// Read-only once handed to an agent; share it behind an `Arc`.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Iterate tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute the named tool with the given input.
    pub async fn dispatch(&self, name: &str, input: &str) -> std::result::Result<String, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
            available: self.names().into_iter().map(String::from).collect(),
        })?;
        tool.execute(input).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut `text` to at most `limit` characters, appending [`TRUNCATION_MARKER`]
/// when anything was removed. Never splits a code point.
pub fn truncate_observation(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text,
    }
}
