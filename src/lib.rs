//! `docpipe` is the content-acquisition core of a documentation website
//! generator: a composable fetch-interception pipeline with layered response
//! caching.
//!
//! Callers ask for content at a logical URL: a GitHub Contents API URL, a
//! `git:` pseudo-URL naming a file at a ref in a repo, a `file:` path, or any
//! plain `https:` resource. The pipeline resolves it through an ordered chain
//! of interceptors:
//!
//! 1.  **Cache**: repeated GETs are answered from an injected store.
//! 2.  **Rewrite**: the URL may be transformed (Contents API → `git:`
//!     identity → local `file:` URL) before any I/O happens.
//! 3.  **Read**: `file:` URLs are served from disk, everything else over HTTP.
//!
//! The GitHub REST client is built on the same pipeline, so structured API
//! access (repo metadata, tags, file content at a ref) gets caching and local
//! checkout overrides for free.
//!
//! # Example: Library Usage
//!
//! ```
//! use docpipe::{ConfigBuilder, Pipeline};
//! use url::Url;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! // 1. Configure. The token would normally come from GITHUB_TOKEN.
//! let config = ConfigBuilder::new().github_token("ghp_example").build()?;
//! let pipeline = Pipeline::new(&config)?;
//!
//! // 2. Fetch a local file through the full interceptor chain.
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("readme.md"), "# hello")?;
//! let url = Url::from_file_path(dir.path().join("readme.md")).unwrap();
//!
//! let response = pipeline.fetch(url).await?;
//! assert!(response.ok());
//! assert_eq!(response.text()?, "# hello");
//! # Ok(())
//! # }
//! ```

// Make modules public if they contain public types used in the API
pub mod cache;
pub mod cancellation;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod github;
pub mod http;
pub mod intercept;
pub mod jsr;
pub mod prelude;
pub mod rewrite;
pub mod signal;

pub mod cli;

// Re-export key public types for easier use as a library
pub use cancellation::CancellationToken;
pub use config::{Config, ConfigBuilder};
pub use http::{Request, Response};

use crate::cache::{CacheStore, MemoryStore};
use crate::errors::{Error, Result};
use crate::fetch::FetchCapability;
use crate::github::GithubClient;
use crate::jsr::JsrClient;
use crate::rewrite::{ContentsApiRewrite, LocalCheckoutRewrite};
use std::sync::Arc;

/// The assembled fetch pipeline and its clients.
///
/// Construction happens once at process start; the value is then shared (or
/// its capabilities cloned out) by every request handler. All interceptor
/// registration happens inside [`Pipeline::with_parts`]; afterwards the
/// capabilities are frozen behind `Arc`s.
pub struct Pipeline {
    fetch: Arc<FetchCapability>,
    github: GithubClient,
    jsr: JsrClient,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Bootstraps the pipeline with a fresh in-memory cache store.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_parts(config, Arc::new(MemoryStore::new()), CancellationToken::new())
    }

    /// Bootstraps the pipeline with an injected cache store and cancellation
    /// token.
    ///
    /// Registration order is the contract here: the cache wraps everything,
    /// rewrites happen before any read, and the Contents API rule runs before
    /// the local checkout rule so a rewritten `git:` identity is resolved in
    /// the same pass.
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn CacheStore>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mut rewrite = rewrite::build();
        if let Some(local_repo) = &config.local_repo {
            log::info!(
                "serving rewritten GitHub content from local checkout '{}'",
                local_repo.display()
            );
            rewrite.register(ContentsApiRewrite::new(config.rewrite_predicate.clone()));
            rewrite.register(LocalCheckoutRewrite::new(local_repo.clone()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let fetch = Arc::new(fetch::build(store, Arc::new(rewrite), client));
        let github = GithubClient::new(&config.github_token, fetch.clone(), cancel.clone())?;
        let jsr = JsrClient::new(config.jsr_api.clone(), fetch.clone());

        Ok(Self {
            fetch,
            github,
            jsr,
            cancel,
        })
    }

    /// Fetches content through the full interceptor chain.
    ///
    /// Checks the cancellation token before starting any work, so a shutdown
    /// signal refuses further requests with [`Error::Interrupted`] instead of
    /// letting them run to completion.
    pub async fn fetch(&self, request: impl Into<Request>) -> Result<Response> {
        if self.cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }
        self.fetch.invoke(request.into()).await
    }

    /// Parses `input` as a URL and fetches it as a GET.
    pub async fn fetch_str(&self, input: &str) -> Result<Response> {
        self.fetch(Request::get_str(input)?).await
    }

    /// The GitHub client bound to this pipeline.
    pub fn github(&self) -> &GithubClient {
        &self.github
    }

    /// The JSR client bound to this pipeline.
    pub fn jsr(&self) -> &JsrClient {
        &self.jsr
    }

    /// The underlying fetch capability, for collaborators that want to issue
    /// requests directly.
    pub fn fetch_capability(&self) -> Arc<FetchCapability> {
        self.fetch.clone()
    }
}
