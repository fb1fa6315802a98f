//! List materials tool: what has the user uploaded?

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;

use crate::{NO_MATERIALS, store_failure};

pub struct ListMaterialsTool {
    store: Arc<dyn MaterialStore>,
}

impl ListMaterialsTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListMaterialsTool {
    fn name(&self) -> &str {
        "list_materials"
    }

    fn usage(&self) -> &str {
        "### list_materials\n\
         Lists all uploaded study materials.\n\
         Input: empty string\n\
         Output: List of materials with id, title, word_count"
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        let materials = self.store.list().await.map_err(store_failure(self.name()))?;
        if materials.is_empty() {
            return Ok(NO_MATERIALS.into());
        }

        Ok(materials
            .iter()
            .map(|m| format!("- ID: {}, Title: {}, Words: {}", m.id, m.title, m.word_count()))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
