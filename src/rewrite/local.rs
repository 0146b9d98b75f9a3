//! Rewrites `git:` pseudo-URLs to `file:` URLs under a local checkout.
//!
//! Enables serving documentation from a local working copy instead of the
//! network during development: once the Contents API rewrite has produced the
//! canonical `git:` identity, this interceptor resolves the repository path
//! against a configured base directory.

use super::parse_git_url;
use crate::errors::Result;
use crate::intercept::{Interceptor, Next};
use futures::future::BoxFuture;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Interceptor resolving `git:` pseudo-URLs to files in a local checkout.
///
/// Malformed `git:` URLs (and URLs of any other scheme) delegate unchanged.
/// Repository paths that are absolute or contain `..` components are also
/// passed through rather than resolved, so a crafted URL cannot escape the
/// checkout directory.
pub struct LocalCheckoutRewrite {
    base: PathBuf,
}

impl LocalCheckoutRewrite {
    /// Creates the interceptor over the given checkout directory.
    ///
    /// The directory should be absolute; a relative base cannot be converted
    /// into a `file:` URL and every rewrite would fall through unchanged.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        if base.is_relative() {
            log::warn!(
                "local checkout path '{}' is relative; git: URLs will not be rewritten",
                base.display()
            );
        }
        Self { base }
    }

    fn resolve(&self, repo_path: &str) -> Option<Url> {
        let relative = Path::new(repo_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            log::warn!(
                "refusing to resolve repository path '{}' outside the checkout",
                repo_path
            );
            return None;
        }
        Url::from_file_path(self.base.join(relative)).ok()
    }
}

impl Interceptor<Url, Url> for LocalCheckoutRewrite {
    fn around<'a>(&'a self, url: Url, next: Next<'a, Url, Url>) -> BoxFuture<'a, Result<Url>> {
        Box::pin(async move {
            let Some(file) = parse_git_url(&url) else {
                return next.run(url).await;
            };
            match self.resolve(&file.path) {
                Some(rewritten) => {
                    log::debug!("serving {} from local checkout: {}", url, rewritten);
                    next.run(rewritten).await
                }
                None => next.run(url).await,
            }
        })
    }
}
