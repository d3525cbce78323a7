use crate::domain::error::DomainError;
use crate::domain::values::provider_kind::ProviderKind;
use crate::domain::values::store_kind::StoreKind;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INDEX_PATH: &str = "./insight_index.json";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub index_path: PathBuf,
    pub store: StoreKind,
    pub provider: ProviderKind,
    pub openai_api_key: Option<String>,
    pub embedding_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub lock_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            store: StoreKind::File,
            provider: ProviderKind::Auto,
            openai_api_key: None,
            embedding_model: None,
            openai_base_url: None,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl IndexConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("INSIGHT_INDEX_PATH") {
            config.index_path = PathBuf::from(path);
        }
        if let Some(store) = get("INSIGHT_STORE") {
            config.store = store.parse().map_err(DomainError::Config)?;
        }
        if let Some(provider) = get("INSIGHT_EMBEDDING_PROVIDER") {
            config.provider = provider.parse().map_err(DomainError::Config)?;
        }
        config.openai_api_key = get("OPENAI_API_KEY");
        config.embedding_model = get("INSIGHT_EMBEDDING_MODEL");
        config.openai_base_url = get("INSIGHT_OPENAI_BASE_URL");

        if let Some(ms) = get("INSIGHT_LOCK_TIMEOUT_MS") {
            config.lock_timeout = Duration::from_millis(parse_number("INSIGHT_LOCK_TIMEOUT_MS", &ms)?);
        }
        if let Some(secs) = get("INSIGHT_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("INSIGHT_REQUEST_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::Config(format!("{key} must be a non-negative integer, got {value}")))
}
