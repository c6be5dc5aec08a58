//! Object model shared by the retrieval pipeline.
//!
//! - `ObjectId` / `ObjectType`: content-addressed identifiers
//! - `RelationStore`, `ObjectStore`, `ChunkReader`: read-side collaborators
//! - `SqliteKnowledgeStore`: local implementation of all three

mod id;
mod sqlite;
mod store;

pub use id::{ObjectId, ObjectType};
pub use sqlite::SqliteKnowledgeStore;
pub use store::{ChunkReader, Document, ObjectStore, RelationStore};
