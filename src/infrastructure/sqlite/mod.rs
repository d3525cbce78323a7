pub mod index_store;
pub mod migrations;
