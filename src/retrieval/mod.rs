//! Retrieval pipeline.
//!
//! This module provides:
//! - `QueryRouter`: embeds query tokens per modality and gathers ranked ids
//! - `Reconstructor`: groups matches under their root document and renders them
//! - `ContextFormatter`: turns one selected match into a prompt-ready block

mod formatter;
mod modality;
mod reconstruct;
mod router;


pub use formatter::{
    parse_offset, parse_offset_str, ContextFormatter, NO_MORE_INFORMATION, PROVIDED_PREAMBLE,
};
pub use modality::Modality;
pub use reconstruct::{ReconstructedGroup, Reconstructor, RenderedDescription};
pub use router::QueryRouter;
