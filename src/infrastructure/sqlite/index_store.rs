use crate::domain::entities::flat_index::FlatL2Index;
use crate::domain::entities::stored_index::StoredIndex;
use crate::domain::error::DomainError;
use crate::domain::ports::index_store::{IndexStore, WriteLock};
use crate::domain::values::embedding_space::EmbeddingSpace;
use crate::infrastructure::file::index_store::FILE_VERSION;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Index persisted in SQLite. Each save rewrites all rows.
///
/// A write lock is an open `BEGIN IMMEDIATE` transaction, so the
/// load-append-save cycle excludes writers in other processes too. `save`
/// commits it; dropping the lock without saving rolls it back.
pub struct SqliteIndexStore {
    conn: Arc<Mutex<Connection>>,
    path: String,
    writer: Arc<AtomicBool>,
    lock_timeout: Duration,
}

impl SqliteIndexStore {
    pub fn open(path: &str, lock_timeout: Duration) -> Result<Self, DomainError> {
        let conn = Connection::open(path)
            .map_err(|e| DomainError::StoreRead(format!("DB error: {e}")))?;
        if path != ":memory:" {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| DomainError::StoreRead(format!("WAL error: {e}")))?;
        }
        conn.busy_timeout(lock_timeout)
            .map_err(|e| DomainError::StoreRead(format!("busy timeout: {e}")))?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_string(),
            writer: Arc::new(AtomicBool::new(false)),
            lock_timeout,
        })
    }

    /// Replace every row with the contents of `index`. The caller owns the
    /// surrounding transaction.
    fn write_rows(conn: &Connection, index: &StoredIndex) -> Result<(), DomainError> {
        let write_err = |e: rusqlite::Error| DomainError::StoreWrite(format!("Failed to save index: {e}"));

        conn.execute("DELETE FROM index_vectors", []).map_err(write_err)?;
        conn.execute("DELETE FROM index_metadata", []).map_err(write_err)?;
        conn.execute(
            "INSERT OR REPLACE INTO index_info (id, dimension, provider, format_version, saved_at) VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                index.dimension() as i64,
                index.provider(),
                FILE_VERSION,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(write_err)?;

        let mut insert_vector = conn
            .prepare("INSERT INTO index_vectors (position, vector) VALUES (?1, ?2)")
            .map_err(write_err)?;
        for position in 0..index.vector_count() {
            if let Some(v) = index.vectors().vector(position) {
                insert_vector
                    .execute(params![position as i64, Self::serialize_vector(v)])
                    .map_err(write_err)?;
            }
        }
        let mut insert_meta = conn
            .prepare("INSERT INTO index_metadata (position, metadata) VALUES (?1, ?2)")
            .map_err(write_err)?;
        for (position, item) in index.metadata().iter().enumerate() {
            let text = serde_json::to_string(item)
                .map_err(|e| DomainError::StoreWrite(format!("metadata: {e}")))?;
            insert_meta
                .execute(params![position as i64, text])
                .map_err(write_err)?;
        }
        Ok(())
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

impl IndexStore for SqliteIndexStore {
    fn load(&self, space: &EmbeddingSpace) -> Result<StoredIndex, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;

        let info: Option<(i64, String)> = conn
            .query_row(
                "SELECT dimension, provider FROM index_info WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;
        let (stored_dim, provider) = match info {
            None => return Ok(StoredIndex::empty(space)),
            Some((d, provider)) => (
                usize::try_from(d)
                    .map_err(|_| DomainError::StoreRead(format!("invalid stored dimension {d}")))?,
                provider,
            ),
        };
        space.check(&provider, stored_dim)?;

        let mut stmt = conn
            .prepare("SELECT vector FROM index_vectors ORDER BY position")
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;
        let blobs = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;
        let mut data = Vec::new();
        for blob in blobs {
            let blob = blob.map_err(|e| DomainError::StoreRead(e.to_string()))?;
            if blob.len() != stored_dim * 4 {
                return Err(DomainError::StoreRead(format!(
                    "vector blob of {} bytes does not match dimension {stored_dim}",
                    blob.len()
                )));
            }
            data.extend(Self::deserialize_vector(&blob));
        }

        let mut stmt = conn
            .prepare("SELECT metadata FROM index_metadata ORDER BY position")
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::StoreRead(e.to_string()))?;
        let mut metadata = Vec::new();
        for row in rows {
            let text = row.map_err(|e| DomainError::StoreRead(e.to_string()))?;
            let value = serde_json::from_str(&text)
                .map_err(|e| DomainError::StoreRead(format!("metadata: {e}")))?;
            metadata.push(value);
        }

        let vectors = FlatL2Index::from_raw(stored_dim, data)?;
        tracing::debug!(path = %self.path, vectors = vectors.len(), "index loaded");
        Ok(StoredIndex::from_parts(provider, vectors, metadata))
    }

    fn save(&self, index: &StoredIndex) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::StoreWrite(e.to_string()))?;
        let write_err = |e: rusqlite::Error| DomainError::StoreWrite(format!("Failed to save index: {e}"));

        if conn.is_autocommit() {
            // No write lock held: use a transaction of our own.
            let tx = conn.transaction().map_err(write_err)?;
            Self::write_rows(&tx, index)?;
            tx.commit().map_err(write_err)?;
        } else {
            // Inside the lock's BEGIN IMMEDIATE. On error the lock rolls back.
            Self::write_rows(&conn, index)?;
            conn.execute_batch("COMMIT").map_err(write_err)?;
        }

        tracing::debug!(path = %self.path, vectors = index.vector_count(), "index saved");
        Ok(())
    }

    fn lock(&self) -> Result<WriteLock, DomainError> {
        // One writer per connection in this process...
        let started = Instant::now();
        while self
            .writer
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            if started.elapsed() >= self.lock_timeout {
                return Err(DomainError::Lock(format!(
                    "timed out after {}ms waiting for writer on {}",
                    self.lock_timeout.as_millis(),
                    self.path
                )));
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        // ...and one per database across connections, waiting up to the busy timeout.
        let begun = self
            .conn
            .lock()
            .map_err(|e| DomainError::Lock(e.to_string()))
            .and_then(|conn| {
                conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| {
                    DomainError::Lock(format!("cannot start write on {}: {e}", self.path))
                })
            });
        if let Err(e) = begun {
            self.writer.store(false, Ordering::Release);
            return Err(e);
        }

        let conn = Arc::clone(&self.conn);
        let writer = Arc::clone(&self.writer);
        Ok(WriteLock::new(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            if !conn.is_autocommit() {
                if let Err(e) = conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %e, "failed to roll back unsaved write");
                }
            }
            drop(conn);
            writer.store(false, Ordering::Release);
        }))
    }

    fn location(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}
