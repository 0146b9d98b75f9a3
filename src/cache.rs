//! The injected key-value store backing the response cache.
//!
//! The cache interceptor (see [`crate::fetch::cache`]) is written against the
//! [`CacheStore`] trait rather than any concrete store, so eviction and TTL
//! policy stay pluggable: the in-memory store below never expires entries
//! (a site build caches for the lifetime of the process), but a disk- or
//! Redis-backed store can be swapped in without touching the interceptor.

use crate::errors::Result;
use crate::http::Response;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Unified interface for response stores.
///
/// Implementations must be safe for concurrent use; the store is opened once
/// per process and shared by every in-flight request. Lookups and insertions
/// for different keys should not serialize each other beyond whatever internal
/// locking the store needs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Looks up a previously stored response.
    ///
    /// Returns `Ok(None)` on a miss. An `Err` from this method is treated by
    /// the cache interceptor as a miss, never as a fetch failure.
    async fn lookup(&self, key: &str) -> Result<Option<Response>>;

    /// Stores a response under the given key, replacing any previous entry.
    async fn put(&self, key: &str, response: Response) -> Result<()>;
}

/// Process-wide in-memory response store.
///
/// Entries live for the lifetime of the process; there is no eviction. The
/// read/write lock is held only for the duration of the map operation itself
/// (response bodies are refcounted buffers, so cloning out of the map is
/// cheap), which keeps concurrent requests on different keys from blocking
/// each other in any meaningful way.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Response>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached responses.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no responses.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn lookup(&self, key: &str) -> Result<Option<Response>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, response: Response) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), response);
        Ok(())
    }
}
