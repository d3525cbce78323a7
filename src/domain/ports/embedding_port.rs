use crate::domain::error::DomainError;
use crate::domain::values::embedding_space::EmbeddingSpace;

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text. The result has exactly `dimension()` entries.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
    fn dimension(&self) -> usize;
    fn name(&self) -> String;

    /// Tag persisted next to the vectors this provider produces.
    fn space(&self) -> EmbeddingSpace {
        EmbeddingSpace::new(self.name(), self.dimension())
    }
}

/// Reject provider output whose length disagrees with the advertised dimension.
pub fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), DomainError> {
    if vector.len() != expected {
        return Err(DomainError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
