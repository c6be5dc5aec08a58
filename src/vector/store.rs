//! Vector index traits — the adapter seam between the retrieval pipeline
//! and the nearest-neighbour engine.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::KnowledgeError;
use crate::object::ObjectId;

/// A named, model-scoped nearest-neighbour collection keyed by `ObjectId`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Store the embedding for `id`, replacing any previous one.
    async fn insert(&self, embedding: &[f32], id: &ObjectId) -> Result<(), KnowledgeError>;

    /// Up to `top_k` ids ranked nearest first.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ObjectId>, KnowledgeError>;

    /// Remove the embedding for `id`. Absent ids are ignored.
    async fn delete(&self, id: &ObjectId) -> Result<(), KnowledgeError>;

    async fn count(&self) -> Result<usize, KnowledgeError>;
}

/// Hands out the collection for an embedding model, creating it on first use.
#[async_trait]
pub trait VectorIndexFactory: Send + Sync {
    async fn collection(&self, model_name: &str) -> Result<Arc<dyn VectorIndex>, KnowledgeError>;
}
