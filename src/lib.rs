pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::add_insight::AddInsightUseCase;
use crate::application::search_insights::SearchInsightsUseCase;
use crate::application::stats::StatsUseCase;
use crate::config::IndexConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::index_store::IndexStore;
use crate::domain::values::index_stats::IndexStats;
use crate::domain::values::neighbor::InsightMatch;
use crate::domain::values::provider_kind::ProviderKind;
use crate::domain::values::store_kind::StoreKind;
use crate::infrastructure::embeddings::selection::select_provider;
use crate::infrastructure::file::index_store::FileIndexStore;
use crate::infrastructure::sqlite::index_store::SqliteIndexStore;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 3;

pub struct InsightIndex {
    add_uc: AddInsightUseCase,
    search_uc: SearchInsightsUseCase,
    stats_uc: StatsUseCase,
    provider_kind: ProviderKind,
    fallback: Option<DomainError>,
}

impl InsightIndex {
    /// Resolve the embedding provider once and open the configured store.
    pub fn new(config: &IndexConfig) -> Result<Self, DomainError> {
        let selection = select_provider(config)?;
        let store: Arc<dyn IndexStore> = match config.store {
            StoreKind::File => Arc::new(FileIndexStore::new(
                config.index_path.clone(),
                config.lock_timeout,
            )),
            StoreKind::Sqlite => {
                let path = config
                    .index_path
                    .to_str()
                    .ok_or_else(|| DomainError::Config("index path is not valid UTF-8".into()))?;
                Arc::new(SqliteIndexStore::open(path, config.lock_timeout)?)
            }
        };

        tracing::info!(
            provider = %selection.provider.name(),
            kind = %selection.kind,
            store = %store.location(),
            "insight index ready"
        );

        let mut index = Self::with_providers(selection.provider, store);
        index.provider_kind = selection.kind;
        index.fallback = selection.fallback;
        Ok(index)
    }

    pub fn with_providers(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn IndexStore>) -> Self {
        Self {
            add_uc: AddInsightUseCase::new(embedder.clone(), store.clone()),
            search_uc: SearchInsightsUseCase::new(embedder.clone(), store.clone()),
            stats_uc: StatsUseCase::new(embedder, store),
            provider_kind: ProviderKind::Auto,
            fallback: None,
        }
    }

    /// Capability in use; `Auto` when the provider was injected directly.
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider_kind
    }

    /// Why the remote provider was skipped, if it was.
    pub fn provider_fallback(&self) -> Option<&DomainError> {
        self.fallback.as_ref()
    }

    pub async fn add_to_index(&self, text: &str, metadata_item: Value) -> Result<usize, DomainError> {
        self.add_uc.execute(text, metadata_item).await
    }

    pub async fn search_similar_insights(&self, text: &str, top_k: usize) -> Result<Vec<Value>, DomainError> {
        self.search_uc.search(text, top_k).await
    }

    pub async fn search_with_scores(&self, text: &str, top_k: usize) -> Result<Vec<InsightMatch>, DomainError> {
        self.search_uc.search_with_scores(text, top_k).await
    }

    pub fn stats(&self) -> Result<IndexStats, DomainError> {
        self.stats_uc.stats()
    }
}
