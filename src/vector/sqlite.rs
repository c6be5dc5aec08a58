//! SQLite-backed vector collections.
//!
//! Embeddings are stored as little-endian f32 blobs; search is brute-force
//! cosine similarity over one collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use super::store::{VectorIndex, VectorIndexFactory};
use crate::core::config::AppPaths;
use crate::core::errors::KnowledgeError;
use crate::object::ObjectId;

pub struct SqliteVectorCollection {
    pool: SqlitePool,
    name: String,
}

impl SqliteVectorCollection {
    fn new(pool: SqlitePool, model_name: &str) -> Self {
        Self {
            pool,
            name: collection_name(model_name),
        }
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }
}

pub fn collection_name(model_name: &str) -> String {
    format!("coll_{}", model_name)
}

#[async_trait]
impl VectorIndex for SqliteVectorCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, embedding: &[f32], id: &ObjectId) -> Result<(), KnowledgeError> {
        tracing::info!("will insert vector: {} id: {}", embedding.len(), id);
        let blob = Self::serialize_embedding(embedding);

        sqlx::query(
            "INSERT OR REPLACE INTO vectors (collection, object_id, embedding)
             VALUES (?1, ?2, ?3)",
        )
        .bind(&self.name)
        .bind(id.to_string())
        .bind(&blob)
        .execute(&self.pool)
        .await
        .map_err(KnowledgeError::index)?;

        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ObjectId>, KnowledgeError> {
        if top_k == 0 || embedding.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT object_id, embedding
             FROM vectors
             WHERE collection = ?1",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await
        .map_err(KnowledgeError::index)?;

        let mut scored: Vec<(String, f32)> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                if stored.len() != embedding.len() {
                    return None;
                }
                let score = Self::cosine_similarity(embedding, &stored);
                Some((row.get::<String, _>("object_id"), score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let ids = scored
            .into_iter()
            .map(|(raw, _)| raw.parse::<ObjectId>().map_err(KnowledgeError::index))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("query result from {}: {} ids", self.name, ids.len());
        Ok(ids)
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), KnowledgeError> {
        sqlx::query("DELETE FROM vectors WHERE collection = ?1 AND object_id = ?2")
            .bind(&self.name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(KnowledgeError::index)?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, KnowledgeError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vectors WHERE collection = ?1")
            .bind(&self.name)
            .fetch_one(&self.pool)
            .await
            .map_err(KnowledgeError::index)?;

        Ok(count as usize)
    }
}

#[derive(Default)]
struct Collections {
    pool: Option<SqlitePool>,
    by_model: HashMap<String, Arc<SqliteVectorCollection>>,
}

/// Lazily opened collections living under one storage root.
///
/// Each model gets exactly one handle for the lifetime of the registry.
pub struct VectorCollections {
    root_dir: PathBuf,
    inner: Mutex<Collections>,
}

impl VectorCollections {
    pub fn new(paths: &AppPaths) -> Self {
        Self::with_root(&paths.embedding_dir)
    }

    pub fn with_root(root_dir: &Path) -> Self {
        Self {
            root_dir: root_dir.to_path_buf(),
            inner: Mutex::new(Collections::default()),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    async fn open_pool(&self) -> Result<SqlitePool, KnowledgeError> {
        let directory = self.root_dir.join("vector");
        tracing::info!("will use vector store: {}", directory.display());
        std::fs::create_dir_all(&directory).map_err(KnowledgeError::index)?;

        let options = SqliteConnectOptions::new()
            .filename(directory.join("collections.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(KnowledgeError::index)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vectors (
                collection TEXT NOT NULL,
                object_id TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (collection, object_id)
            )",
        )
        .execute(&pool)
        .await
        .map_err(KnowledgeError::index)?;

        Ok(pool)
    }

    pub async fn sqlite_collection(
        &self,
        model_name: &str,
    ) -> Result<Arc<SqliteVectorCollection>, KnowledgeError> {
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.by_model.get(model_name) {
            return Ok(existing.clone());
        }

        let pool = if let Some(pool) = inner.pool.clone() {
            pool
        } else {
            let pool = self.open_pool().await?;
            inner.pool = Some(pool.clone());
            pool
        };

        tracing::info!("will init vector collection: {}", collection_name(model_name));
        let collection = Arc::new(SqliteVectorCollection::new(pool, model_name));
        inner
            .by_model
            .insert(model_name.to_string(), collection.clone());
        Ok(collection)
    }
}

#[async_trait]
impl VectorIndexFactory for VectorCollections {
    async fn collection(&self, model_name: &str) -> Result<Arc<dyn VectorIndex>, KnowledgeError> {
        let collection: Arc<dyn VectorIndex> = self.sqlite_collection(model_name).await?;
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    fn id(tag: &str) -> ObjectId {
        ObjectId::from_content(ObjectType::Chunk, tag.as_bytes())
    }

    #[tokio::test]
    async fn insert_and_query_nearest_first() {
        let dir = tempfile::tempdir().unwrap();
        let collections = VectorCollections::with_root(dir.path());
        let coll = collections.collection("all-MiniLM-L6-v2").await.unwrap();

        coll.insert(&[1.0, 0.0, 0.0], &id("east")).await.unwrap();
        coll.insert(&[0.0, 1.0, 0.0], &id("north")).await.unwrap();
        coll.insert(&[0.7, 0.7, 0.0], &id("north-east")).await.unwrap();

        let ids = coll.query(&[0.9, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(ids, vec![id("east"), id("north-east")]);
        assert_eq!(coll.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn empty_collection_and_zero_k_return_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let collections = VectorCollections::with_root(dir.path());
        let coll = collections.collection("m").await.unwrap();

        assert!(coll.query(&[1.0, 0.0], 4).await.unwrap().is_empty());

        coll.insert(&[1.0, 0.0], &id("a")).await.unwrap();
        assert!(coll.query(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_overwrites_and_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let collections = VectorCollections::with_root(dir.path());
        let coll = collections.collection("m").await.unwrap();

        coll.insert(&[1.0, 0.0], &id("a")).await.unwrap();
        coll.insert(&[0.0, 1.0], &id("a")).await.unwrap();
        assert_eq!(coll.count().await.unwrap(), 1);

        coll.delete(&id("a")).await.unwrap();
        coll.delete(&id("a")).await.unwrap();
        assert_eq!(coll.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn collections_are_isolated_per_model_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let collections = VectorCollections::with_root(dir.path());

        let text = collections.sqlite_collection("text-model").await.unwrap();
        let image = collections.sqlite_collection("image-model").await.unwrap();
        let text_again = collections.sqlite_collection("text-model").await.unwrap();

        assert!(Arc::ptr_eq(&text, &text_again));
        assert_eq!(text.name(), "coll_text-model");

        text.insert(&[1.0], &id("a")).await.unwrap();
        assert_eq!(text.count().await.unwrap(), 1);
        assert_eq!(image.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn skips_vectors_of_another_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let collections = VectorCollections::with_root(dir.path());
        let coll = collections.collection("m").await.unwrap();

        coll.insert(&[1.0, 0.0, 0.0], &id("three")).await.unwrap();
        coll.insert(&[1.0, 0.0], &id("two")).await.unwrap();

        let ids = coll.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(ids, vec![id("two")]);
    }

    #[tokio::test]
    async fn unusable_root_is_index_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let collections = VectorCollections::with_root(&blocker);
        let err = collections.collection("m").await.err().unwrap();
        assert!(matches!(err, KnowledgeError::IndexUnavailable(_)));
    }
}
