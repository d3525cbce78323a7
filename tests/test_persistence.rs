mod common;

use common::{file_index, file_index_with, index_path, lock_is_free, FixedEmbedder, LyingEmbedder};
use insight_index::domain::error::DomainError;
use insight_index::domain::ports::index_store::IndexStore;
use insight_index::infrastructure::embeddings::hashing::HashingProvider;
use insight_index::infrastructure::file::index_store::FileIndexStore;
use insight_index::InsightIndex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_index_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let index = file_index(dir.path());
        index.add_to_index("first insight", json!({"id": 1, "level": "team"})).await.unwrap();
        index.add_to_index("second insight", json!({"id": 2})).await.unwrap();
        index.add_to_index("third insight", json!({"id": 3})).await.unwrap();
    }

    let restarted = file_index(dir.path());
    let stats = restarted.stats().unwrap();
    assert_eq!(stats.vectors, 3);
    assert_eq!(stats.metadata, 3);

    let all = restarted.search_with_scores("insight", 3).await.unwrap();
    let mut positions: Vec<usize> = all.iter().map(|m| m.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![0, 1, 2]);
    for m in &all {
        assert_eq!(m.metadata["id"], json!(m.position + 1));
    }
}

#[tokio::test]
async fn test_search_skips_vectors_without_metadata() {
    let dir = TempDir::new().unwrap();
    let doc = json!({
        "header": {
            "format": "insight-index",
            "version": "1.0.0",
            "provider": "fixed",
            "saved_at": "2026-01-01T00:00:00Z"
        },
        "index": {"dimension": 2, "data": [0.0, 0.0, 1.0, 1.0, 0.1, 0.0]},
        "metadata": [{"id": "first"}]
    });
    std::fs::write(index_path(dir.path()), doc.to_string()).unwrap();

    let index = file_index_with(dir.path(), Arc::new(FixedEmbedder { vector: vec![0.1, 0.0] }));
    let results = index.search_similar_insights("query", 3).await.unwrap();
    assert_eq!(results, vec![json!({"id": "first"})]);

    let stats = index.stats().unwrap();
    assert_eq!(stats.vectors, 3);
    assert_eq!(stats.metadata, 1);
}

#[tokio::test]
async fn test_switching_provider_dimension_fails_fast() {
    let dir = TempDir::new().unwrap();
    file_index(dir.path()).add_to_index("recorded with 384 dims", json!(1)).await.unwrap();
    let before = std::fs::read(index_path(dir.path())).unwrap();

    let remote_sized = file_index_with(dir.path(), Arc::new(FixedEmbedder { vector: vec![0.1; 1536] }));
    assert!(matches!(
        remote_sized.add_to_index("new text", json!(2)).await,
        Err(DomainError::DimensionMismatch { expected: 1536, actual: 384 })
    ));
    assert!(matches!(
        remote_sized.search_similar_insights("new text", 3).await,
        Err(DomainError::DimensionMismatch { expected: 1536, actual: 384 })
    ));

    assert_eq!(std::fs::read(index_path(dir.path())).unwrap(), before);
    assert!(lock_is_free(dir.path()));
}

#[tokio::test]
async fn test_switching_provider_with_same_dimension_fails_fast() {
    let dir = TempDir::new().unwrap();
    file_index(dir.path()).add_to_index("recorded by hashing", json!(1)).await.unwrap();
    let before = std::fs::read(index_path(dir.path())).unwrap();

    // Same 384 dimensions, different embedder.
    let foreign = file_index_with(dir.path(), Arc::new(FixedEmbedder { vector: vec![0.1; 384] }));
    match foreign.add_to_index("new text", json!(2)).await {
        Err(DomainError::ProviderMismatch { expected, actual }) => {
            assert_eq!(expected, "fixed");
            assert_eq!(actual, "hashing/384");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        foreign.search_similar_insights("new text", 3).await,
        Err(DomainError::ProviderMismatch { .. })
    ));

    assert_eq!(std::fs::read(index_path(dir.path())).unwrap(), before);
    assert!(lock_is_free(dir.path()));
}

#[tokio::test]
async fn test_provider_output_dimension_is_checked() {
    let dir = TempDir::new().unwrap();
    let index = file_index_with(dir.path(), Arc::new(LyingEmbedder));
    assert!(matches!(
        index.add_to_index("text", json!(1)).await,
        Err(DomainError::DimensionMismatch { expected: 4, actual: 3 })
    ));
    assert!(!index_path(dir.path()).exists());
}

#[tokio::test]
async fn test_corrupt_index_propagates_read_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(index_path(dir.path()), b"\x00\x01garbage").unwrap();
    let index = file_index(dir.path());

    assert!(matches!(
        index.search_similar_insights("x", 1).await,
        Err(DomainError::StoreRead(_))
    ));
    assert!(matches!(
        index.add_to_index("x", json!(1)).await,
        Err(DomainError::StoreRead(_))
    ));
    assert!(lock_is_free(dir.path()));
}

#[tokio::test]
async fn test_failed_save_keeps_previous_index() {
    let dir = TempDir::new().unwrap();
    let index = file_index(dir.path());
    index.add_to_index("kept insight", json!({"id": 1})).await.unwrap();
    let before = std::fs::read(index_path(dir.path())).unwrap();

    // A directory where the temp file should go makes the write fail.
    let temp = dir.path().join("insights.json.tmp");
    std::fs::create_dir(&temp).unwrap();
    assert!(matches!(
        index.add_to_index("lost insight", json!({"id": 2})).await,
        Err(DomainError::StoreWrite(_))
    ));

    assert_eq!(std::fs::read(index_path(dir.path())).unwrap(), before);
    assert_eq!(index.stats().unwrap().vectors, 1);
    assert!(lock_is_free(dir.path()));

    std::fs::remove_dir(&temp).unwrap();
    assert_eq!(index.add_to_index("retried insight", json!({"id": 2})).await.unwrap(), 1);
}

#[tokio::test]
async fn test_lock_file_left_by_crashed_writer_does_not_block() {
    let dir = TempDir::new().unwrap();
    file_index(dir.path()).add_to_index("before the crash", json!(1)).await.unwrap();

    // A killed writer leaves its lock file behind, but the OS lock dies with it.
    std::fs::write(dir.path().join("insights.json.lock"), "99999\n").unwrap();

    let restarted = file_index(dir.path());
    assert_eq!(restarted.add_to_index("after the crash", json!(2)).await.unwrap(), 1);
    assert_eq!(restarted.stats().unwrap().vectors, 2);
}

#[tokio::test]
async fn test_held_lock_blocks_writers_but_not_readers() {
    let dir = TempDir::new().unwrap();
    let index = file_index(dir.path());
    index.add_to_index("existing", json!(1)).await.unwrap();

    let holder = FileIndexStore::new(index_path(dir.path()), Duration::from_millis(20));
    let guard = holder.lock().unwrap();

    let blocked = InsightIndex::with_providers(
        Arc::new(HashingProvider::default()),
        Arc::new(FileIndexStore::new(index_path(dir.path()), Duration::from_millis(20))),
    );
    assert!(matches!(
        blocked.add_to_index("blocked", json!(2)).await,
        Err(DomainError::Lock(_))
    ));
    assert_eq!(blocked.search_similar_insights("existing", 1).await.unwrap(), vec![json!(1)]);

    drop(guard);
    blocked.add_to_index("unblocked", json!(3)).await.unwrap();
    assert_eq!(blocked.stats().unwrap().vectors, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let index = Arc::new(file_index(dir.path()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let index = Arc::clone(&index);
        handles.push(tokio::spawn(async move {
            index.add_to_index(&format!("parallel insight {i}"), json!({ "id": i })).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stats = index.stats().unwrap();
    assert_eq!(stats.vectors, 8);
    assert_eq!(stats.metadata, 8);
}
