//! Collaborator interfaces over the knowledge base.
//!
//! The retrieval pipeline only reads through these traits; storage layout and
//! ingestion belong to the implementations.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::id::ObjectId;
use crate::core::errors::KnowledgeError;

/// A stored object together with its description mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: ObjectId,
    desc: Map<String, Value>,
}

impl Document {
    pub fn new(id: ObjectId, desc: Map<String, Value>) -> Self {
        Self { id, desc }
    }

    /// Returns an owned copy of the description, free to be extended.
    pub fn get_desc(&self) -> Map<String, Value> {
        self.desc.clone()
    }
}

#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Ancestors of `id`, forest root first. Empty when `id` is a root.
    async fn related_root_objects(&self, id: &ObjectId) -> Result<Vec<ObjectId>, KnowledgeError>;
}

#[async_trait]
pub trait ChunkReader: Send + Sync {
    async fn get_chunk(&self, id: &ObjectId) -> Result<Vec<u8>, KnowledgeError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn load_object(&self, id: &ObjectId) -> Result<Document, KnowledgeError>;

    fn chunk_reader(&self) -> &dyn ChunkReader;
}
