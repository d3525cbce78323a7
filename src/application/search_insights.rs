use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{check_dimension, EmbeddingProvider};
use crate::domain::ports::index_store::IndexStore;
use crate::domain::values::neighbor::InsightMatch;
use serde_json::Value;
use std::sync::Arc;

pub struct SearchInsightsUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IndexStore>,
}

impl SearchInsightsUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn IndexStore>) -> Self {
        Self { embedder, store }
    }

    /// Metadata of the `top_k` nearest stored insights, closest first.
    pub async fn search(&self, text: &str, top_k: usize) -> Result<Vec<Value>, DomainError> {
        Ok(self
            .search_with_scores(text, top_k)
            .await?
            .into_iter()
            .map(|m| m.metadata)
            .collect())
    }

    pub async fn search_with_scores(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<InsightMatch>, DomainError> {
        if top_k == 0 {
            return Err(DomainError::InvalidInput("top_k must be at least 1".into()));
        }
        let query = self.embedder.embed(text).await?;
        let space = self.embedder.space();
        check_dimension(space.dimension, &query)?;

        let index = self.store.load(&space)?;
        if index.is_empty() {
            return Ok(vec![]);
        }
        let matches = index.search(&query, top_k)?;
        tracing::info!(top_k, returned = matches.len(), "insight search");
        Ok(matches)
    }
}
