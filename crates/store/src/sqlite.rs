//! SQLite store.
//!
//! One table, `materials`, created on open. The integer `iid` column
//! records upload order so listings can return the newest material first;
//! replacing a material gives it a fresh `iid`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use studybuddy_core::error::StoreError;
use studybuddy_core::material::{Material, MaterialStore, MaterialType, SearchHit, find_snippet};
use tracing::{debug, info};

use crate::SNIPPET_RADIUS;

/// A persistent SQLite material store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// Accepts a plain file path or a `sqlite:` URL.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = if path.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(path)
                .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
        } else {
            SqliteConnectOptions::new().filename(path)
        };

        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite material store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS materials (
                iid         INTEGER PRIMARY KEY AUTOINCREMENT,
                id          TEXT UNIQUE NOT NULL,
                title       TEXT NOT NULL,
                type        TEXT NOT NULL,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                metadata    TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("materials table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_material(row: &sqlx::sqlite::SqliteRow) -> Result<Material, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?;
        let kind: String = row
            .try_get("type")
            .map_err(|e| StoreError::QueryFailed(format!("type column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
        let metadata: String = row.try_get("metadata").unwrap_or_default();

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Material {
            id,
            title,
            kind: MaterialType::parse(&kind),
            content,
            created_at,
            metadata,
        })
    }
}

#[async_trait]
impl MaterialStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn store(&self, material: Material) -> Result<String, StoreError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO materials (id, title, type, content, created_at, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&material.id)
        .bind(&material.title)
        .bind(material.kind.as_str())
        .bind(&material.content)
        .bind(material.created_at.to_rfc3339())
        .bind(&material.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        debug!(id = %material.id, "Stored material");
        Ok(material.id)
    }

    async fn get(&self, id: &str) -> Result<Option<Material>, StoreError> {
        let row = sqlx::query("SELECT * FROM materials WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("GET by ID: {e}")))?;

        row.as_ref().map(Self::row_to_material).transpose()
    }

    async fn list(&self) -> Result<Vec<Material>, StoreError> {
        let rows = sqlx::query("SELECT * FROM materials ORDER BY iid DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("LIST: {e}")))?;

        rows.iter().map(Self::row_to_material).collect()
    }

    async fn search(
        &self,
        query: &str,
        material_ids: &[String],
    ) -> Result<Vec<SearchHit>, StoreError> {
        // SQLite's lower() folds ASCII only, so matching happens in Rust
        let materials = self.list().await?;
        Ok(materials
            .into_iter()
            .filter(|m| material_ids.is_empty() || material_ids.contains(&m.id))
            .filter_map(|m| {
                find_snippet(&m.content, query, SNIPPET_RADIUS).map(|snippet| SearchHit {
                    material_id: m.id,
                    title: m.title,
                    snippet,
                })
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM materials")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM materials")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("CLEAR failed: {e}")))?;

        Ok(())
    }
}
