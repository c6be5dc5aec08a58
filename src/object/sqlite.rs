//! SQLite-backed knowledge store.
//!
//! Holds object descriptions, parent links and raw chunk bytes in one
//! database file.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::id::ObjectId;
use super::store::{ChunkReader, Document, ObjectStore, RelationStore};
use crate::core::config::AppPaths;
use crate::core::errors::KnowledgeError;

pub struct SqliteKnowledgeStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteKnowledgeStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, KnowledgeError> {
        Self::with_path(paths.store_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, KnowledgeError> {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(KnowledgeError::resolution)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), KnowledgeError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS objects (
                object_id TEXT PRIMARY KEY,
                object_type INTEGER NOT NULL,
                desc TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(KnowledgeError::resolution)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS relations (
                object_id TEXT PRIMARY KEY,
                parent_id TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(KnowledgeError::resolution)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_relations_parent ON relations(parent_id)")
            .execute(&self.pool)
            .await
            .map_err(KnowledgeError::resolution)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                object_id TEXT PRIMARY KEY,
                content BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(KnowledgeError::resolution)?;

        Ok(())
    }

    pub async fn put_object(
        &self,
        id: &ObjectId,
        desc: &Map<String, Value>,
    ) -> Result<(), KnowledgeError> {
        let desc_str = serde_json::to_string(desc).map_err(KnowledgeError::resolution)?;

        sqlx::query(
            "INSERT OR REPLACE INTO objects (object_id, object_type, desc) VALUES (?1, ?2, ?3)",
        )
        .bind(id.to_string())
        .bind(i64::from(id.object_type().code()))
        .bind(&desc_str)
        .execute(&self.pool)
        .await
        .map_err(KnowledgeError::resolution)?;

        Ok(())
    }

    /// Records `parent` as the direct parent of `child`, replacing any previous link.
    pub async fn put_relation(
        &self,
        child: &ObjectId,
        parent: &ObjectId,
    ) -> Result<(), KnowledgeError> {
        sqlx::query("INSERT OR REPLACE INTO relations (object_id, parent_id) VALUES (?1, ?2)")
            .bind(child.to_string())
            .bind(parent.to_string())
            .execute(&self.pool)
            .await
            .map_err(KnowledgeError::resolution)?;

        Ok(())
    }

    pub async fn put_chunk(&self, id: &ObjectId, content: &[u8]) -> Result<(), KnowledgeError> {
        sqlx::query("INSERT OR REPLACE INTO chunks (object_id, content) VALUES (?1, ?2)")
            .bind(id.to_string())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(KnowledgeError::resolution)?;

        Ok(())
    }

    async fn parent_of(&self, id: &ObjectId) -> Result<Option<ObjectId>, KnowledgeError> {
        let parent: Option<String> =
            sqlx::query_scalar("SELECT parent_id FROM relations WHERE object_id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(KnowledgeError::resolution)?;

        parent.map(|raw| raw.parse()).transpose()
    }
}

#[async_trait]
impl RelationStore for SqliteKnowledgeStore {
    async fn related_root_objects(&self, id: &ObjectId) -> Result<Vec<ObjectId>, KnowledgeError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([*id]);
        let mut current = *id;

        while let Some(parent) = self.parent_of(&current).await? {
            if !seen.insert(parent) {
                return Err(KnowledgeError::Resolution(format!(
                    "relation cycle through {}",
                    parent
                )));
            }
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        Ok(chain)
    }
}

#[async_trait]
impl ChunkReader for SqliteKnowledgeStore {
    async fn get_chunk(&self, id: &ObjectId) -> Result<Vec<u8>, KnowledgeError> {
        let content: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT content FROM chunks WHERE object_id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(KnowledgeError::resolution)?;

        content.ok_or_else(|| KnowledgeError::Resolution(format!("chunk {} not found", id)))
    }
}

#[async_trait]
impl ObjectStore for SqliteKnowledgeStore {
    async fn load_object(&self, id: &ObjectId) -> Result<Document, KnowledgeError> {
        let row = sqlx::query("SELECT desc FROM objects WHERE object_id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(KnowledgeError::resolution)?
            .ok_or_else(|| KnowledgeError::Resolution(format!("object {} not found", id)))?;

        let desc_str: String = row.get("desc");
        let desc = match serde_json::from_str::<Value>(&desc_str) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(err) => {
                return Err(KnowledgeError::Resolution(format!(
                    "object {} has a corrupt description: {}",
                    id, err
                )))
            }
        };

        Ok(Document::new(*id, desc))
    }

    fn chunk_reader(&self) -> &dyn ChunkReader {
        self
    }
}
