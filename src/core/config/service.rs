use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::core::errors::KnowledgeError;

pub const DEFAULT_TEXT_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_IMAGE_MODEL: &str = "clip-ViT-B-32";
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings server.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1234".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub text_model: String,
    pub image_model: String,
    /// Nearest neighbours fetched per modality for each `query_knowledge` call.
    pub top_k: usize,
    pub embedding: EmbeddingConfig,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            embedding: EmbeddingConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("KNOWLEDGE_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        self.paths.config_path.clone()
    }

    pub fn load_config(&self) -> Result<KnowledgeConfig, KnowledgeError> {
        let mut config = load_yaml_file(&self.config_path())?;

        if let Ok(url) = env::var("KNOWLEDGE_EMBEDDING_URL") {
            if !url.trim().is_empty() {
                config.embedding.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }
}

fn load_yaml_file(path: &std::path::Path) -> Result<KnowledgeConfig, KnowledgeError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(KnowledgeConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(KnowledgeError::config)?;
    if contents.trim().is_empty() {
        return Ok(KnowledgeConfig::default());
    }

    serde_yaml::from_str::<KnowledgeConfig>(&contents)
        .map_err(|err| KnowledgeError::Config(format!("{}: {}", path.display(), err)))
}
