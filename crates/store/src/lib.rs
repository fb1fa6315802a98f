//! Study material storage for StudyBuddy.
//!
//! Backends implement `studybuddy_core::MaterialStore`; [`ingest`] turns
//! uploads into materials, with [`extract`] reading PDF and Office files.

pub mod extract;
pub mod in_memory;
pub mod ingest;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;
use studybuddy_config::StorageConfig;
use studybuddy_core::error::StoreError;
use studybuddy_core::material::MaterialStore;

pub use in_memory::InMemoryStore;
pub use ingest::{extract_text, material_from_file, material_from_text};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Characters of context kept on each side of the start of a search match.
pub const SNIPPET_RADIUS: usize = 80;

/// Open the backend named in the storage config.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn MaterialStore>, StoreError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(SqliteStore::new(&config.path).await?)),
        other => Err(StoreError::Storage(format!(
            "Unsupported storage backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_memory_backend() {
        let config = StorageConfig {
            backend: "memory".into(),
            path: String::new(),
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "in_memory");
    }

    #[tokio::test]
    async fn builds_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: "sqlite".into(),
            path: dir.path().join("m.db").to_string_lossy().into_owned(),
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");
    }

    #[tokio::test]
    async fn rejects_unknown_backend() {
        let config = StorageConfig {
            backend: "postgres".into(),
            path: String::new(),
        };
        assert!(build_store(&config).await.is_err());
    }
}
