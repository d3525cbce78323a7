use crate::config::IndexConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::values::provider_kind::ProviderKind;
use crate::infrastructure::embeddings::hashing::HashingProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use std::sync::Arc;

/// The provider chosen at startup. `kind` is the capability actually in use,
/// never `Auto`. `fallback` carries the remote init error when `Auto` had to
/// settle for an offline provider.
pub struct ProviderSelection {
    pub provider: Arc<dyn EmbeddingProvider>,
    pub kind: ProviderKind,
    pub fallback: Option<DomainError>,
}

impl std::fmt::Debug for ProviderSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSelection")
            .field("provider", &self.provider.name())
            .field("kind", &self.kind)
            .field("fallback", &self.fallback)
            .finish()
    }
}

pub fn select_provider(config: &IndexConfig) -> Result<ProviderSelection, DomainError> {
    match config.provider {
        ProviderKind::Remote => Ok(ProviderSelection {
            provider: Arc::new(remote_provider(config)?),
            kind: ProviderKind::Remote,
            fallback: None,
        }),
        ProviderKind::Local => Ok(ProviderSelection {
            provider: local_model()?,
            kind: ProviderKind::Local,
            fallback: None,
        }),
        ProviderKind::Hashing => Ok(ProviderSelection {
            provider: Arc::new(HashingProvider::default()),
            kind: ProviderKind::Hashing,
            fallback: None,
        }),
        ProviderKind::Auto => match remote_provider(config) {
            Ok(provider) => Ok(ProviderSelection {
                provider: Arc::new(provider),
                kind: ProviderKind::Remote,
                fallback: None,
            }),
            Err(err) => {
                let (provider, kind) = offline_provider()?;
                tracing::warn!(
                    error = %err,
                    provider = %provider.name(),
                    kind = %kind,
                    "remote embedding provider unavailable, using offline provider"
                );
                Ok(ProviderSelection {
                    provider,
                    kind,
                    fallback: Some(err),
                })
            }
        },
    }
}

fn remote_provider(config: &IndexConfig) -> Result<OpenAiProvider, DomainError> {
    OpenAiProvider::try_new(
        config.openai_api_key.clone(),
        config.embedding_model.clone(),
        config.openai_base_url.clone(),
        config.request_timeout,
    )
}

#[cfg(feature = "local-model")]
fn local_model() -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    use crate::infrastructure::embeddings::local::FastEmbedProvider;
    Ok(Arc::new(FastEmbedProvider::try_new()?))
}

#[cfg(not(feature = "local-model"))]
fn local_model() -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    Err(DomainError::ProviderInit(
        "local sentence model not compiled in; rebuild with --features local-model \
         or use INSIGHT_EMBEDDING_PROVIDER=hashing"
            .into(),
    ))
}

/// Best provider that needs no network: the sentence model when compiled in,
/// the hashing embedder otherwise.
#[cfg(feature = "local-model")]
fn offline_provider() -> Result<(Arc<dyn EmbeddingProvider>, ProviderKind), DomainError> {
    Ok((local_model()?, ProviderKind::Local))
}

#[cfg(not(feature = "local-model"))]
fn offline_provider() -> Result<(Arc<dyn EmbeddingProvider>, ProviderKind), DomainError> {
    Ok((Arc::new(HashingProvider::default()), ProviderKind::Hashing))
}
