//! Knowledge retrieval for agent hosts.
//!
//! Query tokens are embedded per modality, matched against local vector
//! collections, resolved back to their root documents and rendered as a JSON
//! context block through the `query_knowledge` tool.

pub mod core;
pub mod embedding;
pub mod object;
pub mod retrieval;
pub mod tools;
pub mod vector;

pub use crate::core::config::{AppPaths, ConfigService, KnowledgeConfig};
pub use crate::core::errors::KnowledgeError;
