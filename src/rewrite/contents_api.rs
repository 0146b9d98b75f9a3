//! Rewrites GitHub Contents API URLs into `git:` pseudo-URLs.

use super::{to_git_url, RepoFile, RewritePredicate};
use crate::errors::Result;
use crate::intercept::{Interceptor, Next};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

/// Path shape of the Contents API: `/repos/{owner}/{repo}/contents/{path}`.
static CONTENTS_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/repos/([^/]+)/([^/]+)/contents/(.+)$").unwrap());

/// Parses a GitHub Contents API URL into the canonical [`RepoFile`] identity.
///
/// Matches `https://api.github.com/repos/{owner}/{repo}/contents/{path}` with
/// an optional `ref` query parameter. The path segment is percent-decoded; a
/// URL of any other shape yields `None`.
pub fn parse_contents_url(url: &Url) -> Option<RepoFile> {
    if url.scheme() != "https" || url.host_str() != Some("api.github.com") {
        return None;
    }
    let caps = CONTENTS_PATH_RE.captures(url.path())?;
    let path = percent_decode_str(&caps[3]).decode_utf8().ok()?.into_owned();
    let git_ref = url
        .query_pairs()
        .find(|(key, _)| key == "ref")
        .map(|(_, value)| value.into_owned());

    Some(RepoFile {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
        path,
        git_ref,
    })
}

/// Interceptor turning Contents API URLs into their transport-free `git:`
/// identity, gated by a caller-supplied predicate.
///
/// URLs that don't match the Contents API shape, or that the predicate
/// declines, delegate unchanged.
pub struct ContentsApiRewrite {
    predicate: RewritePredicate,
}

impl ContentsApiRewrite {
    /// Creates the interceptor with the given takeover predicate.
    pub fn new(predicate: RewritePredicate) -> Self {
        Self { predicate }
    }
}

impl Interceptor<Url, Url> for ContentsApiRewrite {
    fn around<'a>(&'a self, url: Url, next: Next<'a, Url, Url>) -> BoxFuture<'a, Result<Url>> {
        Box::pin(async move {
            let Some(file) = parse_contents_url(&url) else {
                return next.run(url).await;
            };
            if !(self.predicate)(&file) {
                log::trace!("predicate declined rewrite of {}", url);
                return next.run(url).await;
            }
            match to_git_url(&file) {
                Some(rewritten) => {
                    log::debug!("rewrote contents URL {} -> {}", url, rewritten);
                    next.run(rewritten).await
                }
                None => next.run(url).await,
            }
        })
    }
}
