use serde::{Deserialize, Serialize};

/// A position in the flat index and its squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// A search hit resolved to the caller's metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMatch {
    pub position: usize,
    pub distance: f32,
    pub metadata: serde_json::Value,
}
