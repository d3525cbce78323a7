use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::index_store::IndexStore;
use crate::domain::values::index_stats::IndexStats;
use std::sync::Arc;

pub struct StatsUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IndexStore>,
}

impl StatsUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn IndexStore>) -> Self {
        Self { embedder, store }
    }

    pub fn stats(&self) -> Result<IndexStats, DomainError> {
        let index = self.store.load(&self.embedder.space())?;
        Ok(IndexStats {
            vectors: index.vector_count(),
            metadata: index.metadata().len(),
            dimension: index.dimension(),
            provider: self.embedder.name(),
            location: self.store.location(),
        })
    }
}
