use std::sync::Arc;

use super::modality::Modality;
use crate::core::config::KnowledgeConfig;
use crate::core::errors::KnowledgeError;
use crate::embedding::EmbeddingService;
use crate::object::ObjectId;
use crate::vector::VectorIndexFactory;

/// Embeds a query once per requested modality and looks it up in that
/// modality's collection.
pub struct QueryRouter {
    embedder: Arc<dyn EmbeddingService>,
    collections: Arc<dyn VectorIndexFactory>,
    text_model: String,
    image_model: String,
}

impl QueryRouter {
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        collections: Arc<dyn VectorIndexFactory>,
        config: &KnowledgeConfig,
    ) -> Self {
        Self {
            embedder,
            collections,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    pub fn model_for(&self, modality: Modality) -> &str {
        match modality {
            Modality::Text => &self.text_model,
            Modality::Image => &self.image_model,
        }
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingService> {
        &self.embedder
    }

    pub fn collections(&self) -> &Arc<dyn VectorIndexFactory> {
        &self.collections
    }

    /// Text matches always precede image matches; no re-ranking or de-dup
    /// happens across modalities.
    pub async fn query_objects(
        &self,
        tokens: &str,
        modalities: &[Modality],
        top_k: usize,
    ) -> Result<Vec<ObjectId>, KnowledgeError> {
        let mut results = Vec::new();

        for modality in Modality::PRIORITY {
            if !modalities.contains(&modality) {
                continue;
            }

            let model = self.model_for(modality);
            let vector = self.embedder.embed(tokens, model).await?;
            tracing::debug!("{} query embedded to {} dims", modality, vector.len());

            let collection = self.collections.collection(model).await?;
            let ids = collection.query(&vector, top_k).await?;
            tracing::info!("{} query matched {} objects", modality, ids.len());
            results.extend(ids);
        }

        Ok(results)
    }
}
