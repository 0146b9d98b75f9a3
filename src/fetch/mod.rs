//! The content fetcher: final (possibly rewritten) request in, response out.
//!
//! Assembled as a `Capability<Request, Response>` with the layers registered
//! outermost to innermost:
//!
//! 1. [`CacheInterceptor`]: answers repeated GETs from the injected store.
//! 2. [`RewriteStep`]: runs the URL rewrite capability and delegates with the
//!    rewritten request.
//! 3. [`FileReader`]: serves `file:` URLs from disk (including URLs the
//!    rewrite step just produced from `git:` identities).
//! 4. The default implementation, a `reqwest` HTTP fetch.
//!
//! The file reader sits *inside* the rewrite step because `reqwest`, unlike a
//! browser-style fetch, does not consume `file:` URLs itself; a rewritten
//! `file:` URL must still find a handler on its way down to the default.

use crate::cache::CacheStore;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use crate::intercept::{Capability, Interceptor, Next};
use crate::rewrite::RewriteCapability;
use futures::future::BoxFuture;
use std::sync::Arc;
use url::Url;

mod cache;
mod file;

pub use cache::CacheInterceptor;
pub use file::FileReader;

/// The fetch channel: request in, response out.
pub type FetchCapability = Capability<Request, Response>;

/// Interceptor that rewrites the request URL through the rewrite capability
/// before delegating.
///
/// A URL that no rewrite rule claims comes back unchanged, and the request
/// proceeds as-is; rewriting is never an error.
pub struct RewriteStep {
    rewrite: Arc<RewriteCapability>,
}

impl RewriteStep {
    /// Creates the step over the given rewrite capability.
    pub fn new(rewrite: Arc<RewriteCapability>) -> Self {
        Self { rewrite }
    }
}

impl Interceptor<Request, Response> for RewriteStep {
    fn around<'a>(
        &'a self,
        mut request: Request,
        next: Next<'a, Request, Response>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let rewritten = self.rewrite.invoke(request.url().clone()).await?;
            if &rewritten != request.url() {
                log::debug!("fetching {} via {}", request.url(), rewritten);
                request.set_url(rewritten);
            }
            next.run(request).await
        })
    }
}

/// Builds the default implementation: a plain HTTP fetch through `reqwest`.
///
/// Anything that reaches this layer with a non-HTTP scheme fell through every
/// registered handler, which means the chain was assembled wrong; that is an
/// error, not a 404.
fn http_fallback(client: reqwest::Client) -> impl Fn(Request) -> BoxFuture<'static, Result<Response>> {
    move |request: Request| {
        let client = client.clone();
        Box::pin(async move {
            let url = request.url().clone();
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::UnsupportedScheme {
                    scheme: url.scheme().to_string(),
                    url: url.to_string(),
                });
            }
            log::debug!("{} {}", request.method(), url);
            let mut builder = client
                .request(request.method().clone(), url.clone())
                .headers(request.headers().clone());
            if let Some(body) = request.body() {
                builder = builder.body(body.clone());
            }
            let response = builder.send().await.map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;
            Response::from_reqwest(response).await
        })
    }
}

/// Assembles the full fetch capability: cache, rewrite, file reader, HTTP.
pub fn build(
    store: Arc<dyn CacheStore>,
    rewrite: Arc<RewriteCapability>,
    client: reqwest::Client,
) -> FetchCapability {
    let mut fetch = Capability::new("fetch", http_fallback(client));
    fetch.register(CacheInterceptor::new(store));
    fetch.register(RewriteStep::new(rewrite));
    fetch.register(FileReader);
    fetch
}

/// Convenience: invokes the fetch capability for a bare URL as a GET.
pub async fn fetch_url(fetch: &FetchCapability, url: Url) -> Result<Response> {
    fetch.invoke(Request::get(url)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::rewrite;

    #[tokio::test]
    async fn test_unsupported_scheme_reaching_default_is_an_error() {
        // No rewrite rule claims git: URLs here, and the file reader ignores
        // them, so the default sees a scheme it cannot serve.
        let fetch = build(
            Arc::new(MemoryStore::new()),
            Arc::new(rewrite::build()),
            reqwest::Client::new(),
        );
        let url = Url::parse("git://github.com/a/b#x.md").unwrap();
        let err = fetch_url(&fetch, url).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme { .. }));
    }
}
