use async_trait::async_trait;

use crate::core::errors::KnowledgeError;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// embed a single input with the named model
    async fn embed(&self, input: &str, model: &str) -> Result<Vec<f32>, KnowledgeError>;
}
