use crate::domain::entities::stored_index::StoredIndex;
use crate::domain::error::DomainError;
use crate::domain::values::embedding_space::EmbeddingSpace;

pub trait IndexStore: Send + Sync {
    /// Read the persisted index. When nothing is persisted yet, an empty
    /// index in `space` is returned. A persisted index of another dimension
    /// is a `DimensionMismatch`; one written by another provider is a
    /// `ProviderMismatch`.
    fn load(&self, space: &EmbeddingSpace) -> Result<StoredIndex, DomainError>;

    /// Replace the persisted index with `index` as one unit.
    fn save(&self, index: &StoredIndex) -> Result<(), DomainError>;

    /// Exclusive write scope for a load-mutate-save cycle.
    fn lock(&self) -> Result<WriteLock, DomainError>;

    /// Human-readable location (file path or database path).
    fn location(&self) -> String;
}

/// Held for the duration of a write cycle; released when dropped, including
/// on error paths.
pub struct WriteLock {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl WriteLock {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for WriteLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteLock")
            .field("held", &self.release.is_some())
            .finish()
    }
}
