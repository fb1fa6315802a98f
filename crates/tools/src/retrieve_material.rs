//! Retrieve material tool: full text of one material or of all of them.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;

use crate::store_failure;

pub struct RetrieveMaterialTool {
    store: Arc<dyn MaterialStore>,
}

impl RetrieveMaterialTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RetrieveMaterialTool {
    fn name(&self) -> &str {
        "retrieve_material"
    }

    fn usage(&self) -> &str {
        "### retrieve_material\n\
         Gets the full content of materials.\n\
         Input: material_id OR \"all\"\n\
         Output: Full text content"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let id = input.trim();

        if id.is_empty() || id.eq_ignore_ascii_case("all") || id.eq_ignore_ascii_case("none") {
            return self.store.all_content().await.map_err(store_failure(self.name()));
        }

        match self.store.get(id).await.map_err(store_failure(self.name()))? {
            Some(material) => Ok(material.content),
            None => Ok(format!("Material '{id}' not found.")),
        }
    }
}
