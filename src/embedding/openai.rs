use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::EmbeddingService;
use crate::core::config::EmbeddingConfig;
use crate::core::errors::KnowledgeError;

/// Client for servers exposing the OpenAI `/v1/embeddings` endpoint
/// (LM Studio, llama.cpp server, text-embeddings-inference, ...).
#[derive(Clone)]
pub struct OpenAiEmbeddingService {
    base_url: String,
    client: Client,
}

impl OpenAiEmbeddingService {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, KnowledgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(KnowledgeError::embedding)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingService {
    async fn embed(&self, input: &str, model: &str) -> Result<Vec<f32>, KnowledgeError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": model,
            "input": input,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(KnowledgeError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(KnowledgeError::EmbeddingUnavailable(format!(
                "{} returned {}: {}",
                url, status, text
            )));
        }

        let payload: Value = res.json().await.map_err(KnowledgeError::embedding)?;
        tracing::debug!("embedding response received for model {}", model);

        let vector: Vec<f32> = payload["data"][0]["embedding"]
            .as_array()
            .map(|vals| {
                vals.iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect()
            })
            .unwrap_or_default();

        if vector.is_empty() {
            return Err(KnowledgeError::EmbeddingUnavailable(format!(
                "model {} returned no embedding",
                model
            )));
        }

        Ok(vector)
    }
}
