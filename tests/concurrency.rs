// tests/concurrency.rs
// Concurrent access to the shared pipeline: many in-flight requests against
// one process-wide cache store.

use docpipe::prelude::*;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use url::Url;

fn pipeline_with_store() -> (Pipeline, Arc<MemoryStore>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let config = ConfigBuilder::new().github_token("t").build().unwrap();
    let pipeline =
        Pipeline::with_parts(&config, store.clone(), CancellationToken::new()).unwrap();
    (pipeline, store, dir)
}

#[tokio::test]
async fn test_concurrent_requests_for_distinct_keys_all_succeed() {
    let (pipeline, store, dir) = pipeline_with_store();
    let pipeline = Arc::new(pipeline);

    let mut handles = Vec::new();
    for i in 0..16 {
        let path = dir.path().join(format!("doc-{}.md", i));
        fs::write(&path, format!("content {}", i)).unwrap();
        let url = Url::from_file_path(&path).unwrap();
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move { pipeline.fetch(url).await }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.text().unwrap(), format!("content {}", i));
    }
    assert_eq!(store.len().await, 16);
}

#[tokio::test]
async fn test_concurrent_requests_for_the_same_key_converge_on_one_entry() {
    // There is deliberately no single-flight guarantee: concurrent misses may
    // each read the file, but the store ends up with exactly one entry and
    // every caller gets a readable body.
    let (pipeline, store, dir) = pipeline_with_store();
    let pipeline = Arc::new(pipeline);

    let path = dir.path().join("shared.md");
    fs::write(&path, "shared contents").unwrap();
    let url = Url::from_file_path(&path).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pipeline = pipeline.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move { pipeline.fetch(url).await }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.text().unwrap(), "shared contents");
    }
    assert_eq!(store.len().await, 1);
}
