pub mod embedding_space;
pub mod index_stats;
pub mod neighbor;
pub mod provider_kind;
pub mod store_kind;
