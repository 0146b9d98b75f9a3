//! The response cache interceptor.

use crate::cache::CacheStore;
use crate::errors::Result;
use crate::http::{Request, Response};
use crate::intercept::{Interceptor, Next};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Outermost fetch layer: answers repeated GET requests from the injected
/// [`CacheStore`] instead of re-running the rest of the chain.
///
/// * Only GET requests are cacheable ([`Request::cache_key`] returns `None`
///   for everything else); non-GET methods delegate without consulting or
///   populating the store.
/// * On a miss the live response is cloned immediately: one copy goes into
///   the store, the other back to the caller. Bodies are buffered bytes, so
///   neither copy can be an exhausted stream.
/// * A store failure on lookup is logged and treated as a miss; a corrupt or
///   unavailable cache must never turn into a fetch failure. Likewise a
///   failed `put` only costs the caching, not the response.
pub struct CacheInterceptor {
    store: Arc<dyn CacheStore>,
}

impl CacheInterceptor {
    /// Creates the interceptor over the given store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

impl Interceptor<Request, Response> for CacheInterceptor {
    fn around<'a>(
        &'a self,
        request: Request,
        next: Next<'a, Request, Response>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let Some(key) = request.cache_key() else {
                log::trace!("{} {} is not cacheable", request.method(), request.url());
                return next.run(request).await;
            };

            match self.store.lookup(&key).await {
                Ok(Some(cached)) => {
                    log::debug!("cache hit: {}", key);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("cache lookup failed for '{}', treating as miss: {}", key, e);
                }
            }

            let response = next.run(request).await?;
            if let Err(e) = self.store.put(&key, response.clone()).await {
                log::warn!("failed to cache response for '{}': {}", key, e);
            }
            Ok(response)
        })
    }
}
