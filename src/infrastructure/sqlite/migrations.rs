use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS index_info (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            dimension INTEGER NOT NULL,
            provider TEXT NOT NULL,
            format_version TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS index_vectors (
            position INTEGER PRIMARY KEY,
            vector BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS index_metadata (
            position INTEGER PRIMARY KEY,
            metadata TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| DomainError::StoreWrite(format!("Migration failed: {e}")))
}
