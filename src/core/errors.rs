use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("resolution error: {0}")]
    Resolution(String),
    #[error("invalid offset: {0}")]
    InvalidOffset(String),
    #[error("bad arguments: {0}")]
    BadArguments(String),
    #[error("config error: {0}")]
    Config(String),
}

impl KnowledgeError {
    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        KnowledgeError::EmbeddingUnavailable(err.to_string())
    }

    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        KnowledgeError::IndexUnavailable(err.to_string())
    }

    pub fn resolution<E: std::fmt::Display>(err: E) -> Self {
        KnowledgeError::Resolution(err.to_string())
    }

    pub fn config<E: std::fmt::Display>(err: E) -> Self {
        KnowledgeError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_keep_the_source_message() {
        let err = KnowledgeError::index("database is locked");
        assert!(matches!(err, KnowledgeError::IndexUnavailable(_)));
        assert_eq!(err.to_string(), "index unavailable: database is locked");
    }
}
