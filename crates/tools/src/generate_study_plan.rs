//! Study plan tool: turns material titles and a deadline into a planning prompt.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::ToolError;
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::Tool;

use crate::{NO_MATERIALS, store_failure};

pub struct GenerateStudyPlanTool {
    store: Arc<dyn MaterialStore>,
}

impl GenerateStudyPlanTool {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GenerateStudyPlanTool {
    fn name(&self) -> &str {
        "generate_study_plan"
    }

    fn usage(&self) -> &str {
        "### generate_study_plan\n\
         Creates a study plan based on all uploaded materials.\n\
         Input: exam date or duration (e.g., '1 week')"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let materials = self.store.list().await.map_err(store_failure(self.name()))?;
        if materials.is_empty() {
            return Ok(NO_MATERIALS.into());
        }

        let topics = materials
            .iter()
            .map(|m| m.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "Create a detailed study plan for: {topics}.\n\
             Exam date or timeframe: {}.\n\
             Break it down into daily tasks with time estimates.",
            input.trim()
        ))
    }
}
