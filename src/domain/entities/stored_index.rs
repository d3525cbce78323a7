use crate::domain::entities::flat_index::FlatL2Index;
use crate::domain::error::DomainError;
use crate::domain::values::embedding_space::EmbeddingSpace;
use crate::domain::values::neighbor::InsightMatch;
use serde_json::Value;

/// Vectors and their metadata records, kept as two parallel sequences.
///
/// Position `i` of `vectors` belongs to position `i` of `metadata`. The only
/// mutation is [`StoredIndex::append`], which grows both by one. `provider`
/// names the embedder that produced the vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredIndex {
    provider: String,
    vectors: FlatL2Index,
    metadata: Vec<Value>,
}

impl StoredIndex {
    pub fn empty(space: &EmbeddingSpace) -> Self {
        Self {
            provider: space.provider.clone(),
            vectors: FlatL2Index::new(space.dimension),
            metadata: Vec::new(),
        }
    }

    /// Reassemble persisted parts. Count mismatches are tolerated here and
    /// handled at search time.
    pub fn from_parts(provider: String, vectors: FlatL2Index, metadata: Vec<Value>) -> Self {
        if vectors.len() != metadata.len() {
            tracing::warn!(
                vectors = vectors.len(),
                metadata = metadata.len(),
                "index and metadata counts differ; unmatched positions will be skipped"
            );
        }
        Self {
            provider,
            vectors,
            metadata,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn space(&self) -> EmbeddingSpace {
        EmbeddingSpace::new(self.provider.clone(), self.dimension())
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn vectors(&self) -> &FlatL2Index {
        &self.vectors
    }

    pub fn metadata(&self) -> &[Value] {
        &self.metadata
    }

    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn is_consistent(&self) -> bool {
        self.vectors.len() == self.metadata.len()
    }

    /// Add one (vector, metadata) pair. Nothing is appended on error.
    pub fn append(&mut self, vector: &[f32], metadata: Value) -> Result<usize, DomainError> {
        let position = self.vectors.add(vector)?;
        self.metadata.push(metadata);
        Ok(position)
    }

    /// Exact L2 search, closest first, resolved to metadata. Positions with
    /// no metadata record are dropped.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<InsightMatch>, DomainError> {
        if self.vectors.is_empty() {
            return Ok(vec![]);
        }
        let neighbors = self.vectors.search(query, top_k)?;
        Ok(neighbors
            .into_iter()
            .filter_map(|n| {
                self.metadata.get(n.position).map(|m| InsightMatch {
                    position: n.position,
                    distance: n.distance,
                    metadata: m.clone(),
                })
            })
            .collect())
    }
}
