//! Study tools for the StudyBuddy agent.
//!
//! Every tool reads from a shared [`MaterialStore`]: listing, retrieving
//! and searching materials, or wrapping their content in a prompt for a
//! quiz, a study plan or a cheat sheet. Tools never call the model
//! themselves; their observation is fed back into the loop.

pub mod generate_cheatsheet;
pub mod generate_quiz;
pub mod generate_study_plan;
pub mod list_materials;
pub mod retrieve_material;
pub mod search_material;

use std::sync::Arc;
use studybuddy_core::error::{StoreError, ToolError};
use studybuddy_core::material::MaterialStore;
use studybuddy_core::tool::ToolRegistry;

pub use generate_cheatsheet::GenerateCheatsheetTool;
pub use generate_quiz::GenerateQuizTool;
pub use generate_study_plan::GenerateStudyPlanTool;
pub use list_materials::ListMaterialsTool;
pub use retrieve_material::RetrieveMaterialTool;
pub use search_material::SearchMaterialTool;

/// Observation returned when the store holds nothing.
pub const NO_MATERIALS: &str = "No materials uploaded yet.";

/// Create a registry with all six study tools, in prompt order.
pub fn studybuddy_registry(store: Arc<dyn MaterialStore>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ListMaterialsTool::new(store.clone())))?;
    registry.register(Box::new(RetrieveMaterialTool::new(store.clone())))?;
    registry.register(Box::new(SearchMaterialTool::new(store.clone())))?;
    registry.register(Box::new(GenerateQuizTool::new(store.clone())))?;
    registry.register(Box::new(GenerateStudyPlanTool::new(store.clone())))?;
    registry.register(Box::new(GenerateCheatsheetTool::new(store)))?;
    Ok(registry)
}

/// Wrap a store failure as a failed execution of `tool_name`.
pub(crate) fn store_failure(tool_name: &str) -> impl FnOnce(StoreError) -> ToolError + '_ {
    move |e| ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    }
}
