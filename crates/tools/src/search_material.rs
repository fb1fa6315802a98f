//! Search material tool: literal, case-insensitive keyword search.
//!
//! Each material contributes at most one snippet: its first match with
//! surrounding context, flattened onto one line.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;
use tracing::debug;

use crate::{NO_MATERIALS, store_failure};

pub struct SearchMaterialTool {
    store: Arc<dyn MaterialStore>,
}

impl SearchMaterialTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SearchMaterialTool {
    fn name(&self) -> &str {
        "search_material"
    }

    fn usage(&self) -> &str {
        "### search_material\n\
         Searches for keywords in uploaded materials.\n\
         Input: search query\n\
         Output: matching text snippets"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim().to_lowercase();
        if query.is_empty() {
            return Ok("Search query is empty.".into());
        }

        if self.store.count().await.map_err(store_failure(self.name()))? == 0 {
            return Ok(NO_MATERIALS.into());
        }

        let hits = self
            .store
            .search(&query, &[])
            .await
            .map_err(store_failure(self.name()))?;
        debug!(query = %query, hits = hits.len(), "Material search");

        if hits.is_empty() {
            return Ok(format!("No results for '{query}'."));
        }

        Ok(hits
            .iter()
            .map(|hit| format!("From {}:\n...{}...", hit.title, hit.snippet.replace('\n', " ")))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
