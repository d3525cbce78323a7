//! Shared test helpers.
#![allow(dead_code)]

use insight_index::domain::error::DomainError;
use insight_index::domain::ports::embedding_port::EmbeddingProvider;
use insight_index::infrastructure::embeddings::hashing::HashingProvider;
use insight_index::infrastructure::file::index_store::FileIndexStore;
use insight_index::infrastructure::sqlite::index_store::SqliteIndexStore;
use insight_index::domain::ports::index_store::IndexStore;
use insight_index::InsightIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn index_path(dir: &Path) -> PathBuf {
    dir.join("insights.json")
}

pub fn file_index(dir: &Path) -> InsightIndex {
    file_index_with(dir, Arc::new(HashingProvider::default()))
}

pub fn file_index_with(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> InsightIndex {
    let store = FileIndexStore::new(index_path(dir), Duration::from_secs(5));
    InsightIndex::with_providers(embedder, Arc::new(store))
}

/// Whether a writer could take the index lock right now.
pub fn lock_is_free(dir: &Path) -> bool {
    FileIndexStore::new(index_path(dir), Duration::from_millis(20))
        .lock()
        .is_ok()
}

pub fn sqlite_index() -> InsightIndex {
    let store = SqliteIndexStore::open(":memory:", Duration::from_secs(5)).unwrap();
    InsightIndex::with_providers(Arc::new(HashingProvider::default()), Arc::new(store))
}

/// Returns the same vector for every text.
pub struct FixedEmbedder {
    pub vector: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.vector.clone())
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }

    fn name(&self) -> String {
        "fixed".into()
    }
}

/// Advertises one dimension but returns another.
pub struct LyingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for LyingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(vec![0.0; 3])
    }

    fn dimension(&self) -> usize {
        4
    }

    fn name(&self) -> String {
        "lying".into()
    }
}

/// Serve a single HTTP response on a local port and return its base URL.
pub async fn serve_once(status: u16, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}

async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }
}

/// OpenAI-style embeddings response body.
pub fn embeddings_body(vectors: &[Vec<f32>]) -> String {
    let data: Vec<serde_json::Value> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| serde_json::json!({ "object": "embedding", "index": i, "embedding": v }))
        .collect();
    serde_json::json!({ "object": "list", "data": data, "model": "text-embedding-ada-002" }).to_string()
}
