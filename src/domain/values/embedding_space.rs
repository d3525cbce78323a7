use crate::domain::error::DomainError;

/// The provider and dimension that produced a set of vectors.
///
/// Vectors are only comparable inside one space: two providers with the same
/// dimension still disagree on what each coordinate means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSpace {
    pub provider: String,
    pub dimension: usize,
}

impl EmbeddingSpace {
    pub fn new(provider: impl Into<String>, dimension: usize) -> Self {
        Self {
            provider: provider.into(),
            dimension,
        }
    }

    /// Accept a persisted index only if it was written in this space.
    /// Dimension is checked before the provider tag.
    pub fn check(&self, provider: &str, dimension: usize) -> Result<(), DomainError> {
        if dimension != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: dimension,
            });
        }
        if provider != self.provider {
            return Err(DomainError::ProviderMismatch {
                expected: self.provider.clone(),
                actual: provider.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_dimension_other_provider_is_rejected() {
        let space = EmbeddingSpace::new("local/all-MiniLM-L6-v2", 384);
        assert!(space.check("local/all-MiniLM-L6-v2", 384).is_ok());
        assert!(matches!(
            space.check("hashing/384", 384),
            Err(DomainError::ProviderMismatch { .. })
        ));
    }

    #[test]
    fn test_dimension_is_reported_first() {
        let space = EmbeddingSpace::new("openai/text-embedding-ada-002", 1536);
        assert!(matches!(
            space.check("hashing/384", 384),
            Err(DomainError::DimensionMismatch { expected: 1536, actual: 384 })
        ));
    }
}
