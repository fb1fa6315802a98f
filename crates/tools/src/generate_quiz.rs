//! Quiz tool: wraps all material content in a quiz-writing prompt.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;

use crate::store_failure;

/// Questions requested when the input is not a number.
pub const DEFAULT_QUESTIONS: i64 = 5;

pub struct GenerateQuizTool {
    store: Arc<dyn MaterialStore>,
}

impl GenerateQuizTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GenerateQuizTool {
    fn name(&self) -> &str {
        "generate_quiz"
    }

    fn usage(&self) -> &str {
        "### generate_quiz\n\
         Generates quiz questions from the materials.\n\
         Input: number of questions or empty"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let count = input.trim().parse::<i64>().unwrap_or(DEFAULT_QUESTIONS);
        let content = self.store.all_content().await.map_err(store_failure(self.name()))?;
        Ok(format!(
            "Create {count} multiple choice questions from this material:\n\n{content}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_with;

    #[tokio::test]
    async fn uses_requested_count() {
        let tool = GenerateQuizTool::new(store_with(&[("Biology", "Cells")]).await);
        assert_eq!(
            tool.execute(" 3 ").await.unwrap(),
            "Create 3 multiple choice questions from this material:\n\n=== Biology ===\nCells"
        );
    }

    #[tokio::test]
    async fn defaults_to_five() {
        let tool = GenerateQuizTool::new(store_with(&[]).await);
        for input in ["", "a few", "2.5"] {
            assert!(
                tool.execute(input)
                    .await
                    .unwrap()
                    .starts_with("Create 5 multiple choice questions"),
                "input {input:?}"
            );
        }
    }
}
