use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub vectors: usize,
    pub metadata: usize,
    pub dimension: usize,
    pub provider: String,
    pub location: String,
}
