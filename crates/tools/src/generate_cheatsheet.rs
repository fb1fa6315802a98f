//! Cheat sheet tool.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;

use crate::store_failure;

pub struct GenerateCheatsheetTool {
    store: Arc<dyn MaterialStore>,
}

impl GenerateCheatsheetTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GenerateCheatsheetTool {
    fn name(&self) -> &str {
        "generate_cheatsheet"
    }

    fn usage(&self) -> &str {
        "### generate_cheatsheet\n\
         Creates a condensed cheat sheet from all materials."
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        let content = self.store.all_content().await.map_err(store_failure(self.name()))?;
        Ok(format!(
            "Create a condensed cheat sheet summarizing key points from:\n\n{content}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_with;

    #[tokio::test]
    async fn wraps_all_content() {
        let tool = GenerateCheatsheetTool::new(store_with(&[("Biology", "Cells")]).await);
        assert_eq!(
            tool.execute("").await.unwrap(),
            "Create a condensed cheat sheet summarizing key points from:\n\n=== Biology ===\nCells"
        );
    }

    #[tokio::test]
    async fn empty_store_placeholder() {
        let tool = GenerateCheatsheetTool::new(store_with(&[]).await);
        assert!(tool.execute("").await.unwrap().ends_with("[No materials uploaded yet]"));
    }
}
