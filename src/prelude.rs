//! The `docpipe` prelude for convenient library usage.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the `docpipe` library.
//!
//! # Example
//!
//! ```
//! use docpipe::prelude::*;
//! # fn main() -> Result<()> {
//!
//! let config = ConfigBuilder::new().github_token("ghp_example").build()?;
//! let pipeline = Pipeline::new(&config)?;
//! let token = CancellationToken::new();
//!
//! # let _ = (pipeline, token);
//! # Ok(())
//! # }
//! ```

pub use crate::cache::{CacheStore, MemoryStore};
pub use crate::cancellation::CancellationToken;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::errors::{Error, Result};
pub use crate::fetch::{CacheInterceptor, FetchCapability, FileReader, RewriteStep};
pub use crate::github::{GithubClient, Repo, Tag};
pub use crate::http::{Request, Response};
pub use crate::intercept::{Capability, Interceptor, Next};
pub use crate::jsr::JsrClient;
pub use crate::rewrite::{
    parse_git_url, to_git_url, ContentsApiRewrite, LocalCheckoutRewrite, RepoFile,
    RewriteCapability, RewritePredicate,
};
pub use crate::Pipeline;
