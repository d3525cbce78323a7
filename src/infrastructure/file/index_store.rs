//! Single-file JSON container for the index.
//!
//! ```json
//! {
//!   "header": { "format": "insight-index", "version": "1.0.0",
//!               "provider": "openai/text-embedding-ada-002", "saved_at": "..." },
//!   "index": { "dimension": 384, "data": [0.12, ...] },
//!   "metadata": [ {"id": 1}, ... ]
//! }
//! ```
//!
//! Saves go to `<file>.tmp` and are renamed over the target, so readers see
//! either the old pair or the new pair. Writers serialize on `<file>.lock`.

use crate::domain::entities::flat_index::FlatL2Index;
use crate::domain::entities::stored_index::StoredIndex;
use crate::domain::error::DomainError;
use crate::domain::ports::index_store::{IndexStore, WriteLock};
use crate::domain::values::embedding_space::EmbeddingSpace;
use crate::infrastructure::file::lock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const FILE_FORMAT: &str = "insight-index";
pub const FILE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct FileHeader {
    pub format: String,
    pub version: String,
    pub provider: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct IndexFile {
    header: FileHeader,
    index: FlatL2Index,
    metadata: Vec<Value>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    header: FileHeader,
    index: &'a FlatL2Index,
    metadata: &'a [Value],
}

pub struct FileIndexStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl FileIndexStore {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, ".lock")
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        let written = File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl IndexStore for FileIndexStore {
    fn load(&self, space: &EmbeddingSpace) -> Result<StoredIndex, DomainError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), dimension = space.dimension, "no index file, starting empty");
            return Ok(StoredIndex::empty(space));
        }

        let bytes = fs::read(&self.path)
            .map_err(|e| DomainError::StoreRead(format!("{}: {e}", self.path.display())))?;
        let file: IndexFile = serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::StoreRead(format!("{}: {e}", self.path.display())))?;

        if file.header.format != FILE_FORMAT {
            return Err(DomainError::StoreRead(format!(
                "expected format '{FILE_FORMAT}', got '{}'",
                file.header.format
            )));
        }
        if file.header.version != FILE_VERSION {
            return Err(DomainError::StoreRead(format!(
                "expected version {FILE_VERSION}, got {}",
                file.header.version
            )));
        }
        file.index.validate()?;
        space.check(&file.header.provider, file.index.dimension())?;

        tracing::debug!(
            path = %self.path.display(),
            vectors = file.index.len(),
            saved_at = %file.header.saved_at,
            "index loaded"
        );
        Ok(StoredIndex::from_parts(
            file.header.provider,
            file.index,
            file.metadata,
        ))
    }

    fn save(&self, index: &StoredIndex) -> Result<(), DomainError> {
        let file = IndexFileRef {
            header: FileHeader {
                format: FILE_FORMAT.to_string(),
                version: FILE_VERSION.to_string(),
                provider: index.provider().to_string(),
                saved_at: Utc::now(),
            },
            index: index.vectors(),
            metadata: index.metadata(),
        };
        let bytes = serde_json::to_vec(&file)
            .map_err(|e| DomainError::StoreWrite(format!("serialize index: {e}")))?;
        self.write_atomically(&bytes)
            .map_err(|e| DomainError::StoreWrite(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), vectors = index.vector_count(), "index saved");
        Ok(())
    }

    fn lock(&self) -> Result<WriteLock, DomainError> {
        lock::acquire(&self.lock_path(), self.lock_timeout)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
