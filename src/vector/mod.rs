//! Vector index adapter.
//!
//! - `VectorIndex`: insert / query / delete over one model's collection
//! - `VectorIndexFactory`: lazily creates and reuses collections per model
//! - `VectorCollections`: SQLite implementation rooted in the embedding dir

mod sqlite;
mod store;

pub use sqlite::{collection_name, SqliteVectorCollection, VectorCollections};
pub use store::{VectorIndex, VectorIndexFactory};
