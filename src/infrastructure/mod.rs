pub mod embeddings;
pub mod file;
pub mod sqlite;
