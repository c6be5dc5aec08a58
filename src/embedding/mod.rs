mod openai;
mod provider;

pub use openai::OpenAiEmbeddingService;
pub use provider::EmbeddingService;
