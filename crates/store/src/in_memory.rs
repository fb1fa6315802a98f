//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::sync::Arc;
use studybuddy_core::error::StoreError;
use studybuddy_core::material::{Material, MaterialStore, SearchHit, find_snippet};
use tokio::sync::RwLock;

use crate::SNIPPET_RADIUS;

/// A store that keeps materials in a Vec, oldest first.
pub struct InMemoryStore {
    materials: Arc<RwLock<Vec<Material>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            materials: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaterialStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn store(&self, material: Material) -> Result<String, StoreError> {
        let id = material.id.clone();
        let mut materials = self.materials.write().await;
        // A replaced material counts as newly uploaded
        materials.retain(|m| m.id != id);
        materials.push(material);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Material>, StoreError> {
        let materials = self.materials.read().await;
        Ok(materials.iter().find(|m| m.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Material>, StoreError> {
        let materials = self.materials.read().await;
        Ok(materials.iter().rev().cloned().collect())
    }

    async fn search(
        &self,
        query: &str,
        material_ids: &[String],
    ) -> Result<Vec<SearchHit>, StoreError> {
        let materials = self.materials.read().await;
        Ok(materials
            .iter()
            .rev()
            .filter(|m| material_ids.is_empty() || material_ids.contains(&m.id))
            .filter_map(|m| {
                find_snippet(&m.content, query, SNIPPET_RADIUS).map(|snippet| SearchHit {
                    material_id: m.id.clone(),
                    title: m.title.clone(),
                    snippet,
                })
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut materials = self.materials.write().await;
        let len_before = materials.len();
        materials.retain(|m| m.id != id);
        Ok(materials.len() < len_before)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.materials.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.materials.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::material_from_text;
    use studybuddy_core::material::EMPTY_STORE_CONTENT;

    #[tokio::test]
    async fn store_and_retrieve() {
        let store = InMemoryStore::new();
        let material = material_from_text("Rust is a systems language", "Rust");
        let id = store.store(material).await.unwrap();

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Rust is a systems language");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryStore::new();
        store.store(material_from_text("one", "First")).await.unwrap();
        store.store(material_from_text("two", "Second")).await.unwrap();

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn replacing_keeps_one_copy() {
        let store = InMemoryStore::new();
        let mut material = material_from_text("v1", "Notes");
        let id = store.store(material.clone()).await.unwrap();
        material.content = "v2".into();
        store.store(material).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(&id).await.unwrap().unwrap().content, "v2");
    }

    #[tokio::test]
    async fn search_filters_by_id() {
        let store = InMemoryStore::new();
        let bio = store
            .store(material_from_text("The mitochondria is the powerhouse", "Biology"))
            .await
            .unwrap();
        store
            .store(material_from_text("Mitochondria appear in this chemistry note", "Chemistry"))
            .await
            .unwrap();

        let all = store.search("MITOCHONDRIA", &[]).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Chemistry");

        let only_bio = store.search("mitochondria", &[bio.clone()]).await.unwrap();
        assert_eq!(only_bio.len(), 1);
        assert_eq!(only_bio[0].material_id, bio);

        assert!(store.search("ribosome", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn content_blocks() {
        let store = InMemoryStore::new();
        assert_eq!(store.all_content().await.unwrap(), EMPTY_STORE_CONTENT);

        let id = store.store(material_from_text("Cells", "Biology")).await.unwrap();
        let blocks = store
            .content_by_ids(&[id, "unknown".to_string()])
            .await
            .unwrap();
        assert_eq!(blocks, "=== Biology ===\nCells");
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let store = InMemoryStore::new();
        let id = store.store(material_from_text("a", "A")).await.unwrap();
        store.store(material_from_text("b", "B")).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
