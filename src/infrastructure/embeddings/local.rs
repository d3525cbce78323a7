//! Local sentence-embedding model (all-MiniLM-L6-v2) through fastembed.

use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{check_dimension, EmbeddingProvider};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;

pub const LOCAL_MODEL_NAME: &str = "all-MiniLM-L6-v2";
pub const LOCAL_DIMENSION: usize = 384;

pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Loads (and on first use downloads) the model weights.
    pub fn try_new() -> Result<Self, DomainError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| DomainError::ProviderInit(format!("{LOCAL_MODEL_NAME}: {e}")))?;
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let model = Arc::clone(&self.model);
        let input = vec![text.to_string()];
        let output = tokio::task::spawn_blocking(move || model.embed(input, None))
            .await
            .map_err(|e| DomainError::EmbeddingRequest(format!("local model task failed: {e}")))?
            .map_err(|e| DomainError::EmbeddingRequest(format!("local model error: {e}")))?;

        let vector = output
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::EmbeddingRequest("local model returned no embeddings".into()))?;
        check_dimension(LOCAL_DIMENSION, &vector)?;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        LOCAL_DIMENSION
    }

    fn name(&self) -> String {
        format!("local/{LOCAL_MODEL_NAME}")
    }
}
