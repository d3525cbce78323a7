use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Embedding provider init failed: {0}")]
    ProviderInit(String),

    #[error("Embedding request failed: {0}")]
    EmbeddingRequest(String),

    #[error("Index read error: {0}")]
    StoreRead(String),

    #[error("Index write error: {0}")]
    StoreWrite(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider mismatch: index was written by '{actual}', active provider is '{expected}'")]
    ProviderMismatch { expected: String, actual: String },

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),
}

