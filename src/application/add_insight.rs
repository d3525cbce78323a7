use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{check_dimension, EmbeddingProvider};
use crate::domain::ports::index_store::IndexStore;
use serde_json::Value;
use std::sync::Arc;

pub struct AddInsightUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IndexStore>,
}

impl AddInsightUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn IndexStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed `text` and append it with `metadata` to the persisted index.
    /// Returns the position of the new entry.
    pub async fn execute(&self, text: &str, metadata: Value) -> Result<usize, DomainError> {
        let vector = self.embedder.embed(text).await?;
        let space = self.embedder.space();
        check_dimension(space.dimension, &vector)?;

        // Waiting for the lock and the file I/O block, so the whole
        // load-append-save cycle runs on the blocking pool.
        let store = Arc::clone(&self.store);
        let position = tokio::task::spawn_blocking(move || -> Result<usize, DomainError> {
            let _lock = store.lock()?;
            let mut index = store.load(&space)?;
            let position = index.append(&vector, metadata)?;
            store.save(&index)?;
            Ok(position)
        })
        .await
        .map_err(|e| DomainError::StoreWrite(format!("index write task failed: {e}")))??;

        tracing::info!(position, store = %self.store.location(), "insight added");
        Ok(position)
    }
}
