//! The URL rewrite chain.
//!
//! A `Capability<Url, Url>` whose interceptors transform a candidate URL
//! before any content fetch occurs. Rewriting is pure (no I/O happens here)
//! and a URL that matches no rule passes through the identity default
//! unchanged.
//!
//! Two interceptors ship with this module:
//! - [`ContentsApiRewrite`]: GitHub Contents API URL → `git:` pseudo-URL,
//!   gated by a caller-supplied predicate.
//! - [`LocalCheckoutRewrite`]: `git:` pseudo-URL → `file:` URL under a local
//!   working copy, for serving docs from a checkout during development.
//!
//! The `git:` pseudo-URL convention
//! (`git://{host}/{owner}/{repo}?ref={ref}#{percent-encoded path}`) is the
//! transport-free canonical identity for "a specific file at a specific ref in
//! a specific repo". The path lives in the fragment, percent-encoded so that
//! filenames containing `/`, `%`, or unicode survive the round trip exactly.

use crate::intercept::Capability;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::sync::Arc;
use url::Url;

mod contents_api;
mod local;

pub use contents_api::ContentsApiRewrite;
pub use local::LocalCheckoutRewrite;

/// The rewrite channel: URL in, possibly-different URL out.
pub type RewriteCapability = Capability<Url, Url>;

/// Predicate deciding whether a Contents API URL should be taken over by the
/// rewrite chain (and ultimately served from somewhere other than GitHub).
pub type RewritePredicate = Arc<dyn Fn(&RepoFile) -> bool + Send + Sync>;

/// Builds the rewrite capability with its identity default and no
/// interceptors registered. The application registers rewrite rules during
/// bootstrap according to its configuration.
pub fn build() -> RewriteCapability {
    Capability::new("url-rewrite", |url: Url| Box::pin(async move { Ok(url) }))
}

/// Canonical identity of a file at a ref in a repository.
///
/// `path` is the percent-DECODED repository path; encoding is applied only
/// when the identity is serialized into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path of the file within the repository.
    pub path: String,
    /// Branch, tag, or commit identifier; `None` means the default branch.
    pub git_ref: Option<String>,
}

/// Characters percent-encoded when a repository path is embedded in a `git:`
/// pseudo-URL fragment. `/` and `%` are always encoded so the path
/// round-trips exactly; the rest keep the serialized URL well-formed.
/// (Non-ASCII bytes are always encoded by `utf8_percent_encode`.)
const FRAGMENT_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%')
    .add(b'/')
    .add(b'&')
    .add(b'+');

/// Percent-encodes a decoded repository path for embedding in a URL fragment
/// (or a Contents API path segment).
pub fn encode_repo_path(path: &str) -> String {
    utf8_percent_encode(path, FRAGMENT_PATH).to_string()
}

/// Serializes a [`RepoFile`] into its `git:` pseudo-URL form.
///
/// When `git_ref` is absent the URL carries no query component at all (no
/// trailing `?`).
pub fn to_git_url(file: &RepoFile) -> Option<Url> {
    let mut url = Url::parse(&format!("git://github.com/{}/{}", file.owner, file.repo)).ok()?;
    if let Some(git_ref) = &file.git_ref {
        url.query_pairs_mut().append_pair("ref", git_ref);
    }
    url.set_fragment(Some(&encode_repo_path(&file.path)));
    Some(url)
}

/// Parses a `git:` pseudo-URL back into a [`RepoFile`].
///
/// Returns `None` for anything malformed; the caller delegates the URL
/// unchanged rather than erroring, because "no match" is not a failure.
pub fn parse_git_url(url: &Url) -> Option<RepoFile> {
    if url.scheme() != "git" {
        return None;
    }
    url.host_str()?;

    let mut segments = url.path_segments()?;
    let owner = segments.next().filter(|s| !s.is_empty())?.to_string();
    let repo = segments.next().filter(|s| !s.is_empty())?.to_string();
    if segments.next().is_some() {
        return None;
    }

    let git_ref = url
        .query_pairs()
        .find(|(key, _)| key == "ref")
        .map(|(_, value)| value.into_owned());

    let fragment = url.fragment().filter(|f| !f.is_empty())?;
    let path = percent_decode_str(fragment)
        .decode_utf8()
        .ok()?
        .into_owned();

    Some(RepoFile {
        owner,
        repo,
        path,
        git_ref,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn repo_file(path: &str, git_ref: Option<&str>) -> RepoFile {
        RepoFile {
            owner: "thefrontside".to_string(),
            repo: "effection".to_string(),
            path: path.to_string(),
            git_ref: git_ref.map(String::from),
        }
    }

    #[test]
    fn test_git_url_round_trip_plain_path() {
        let file = repo_file("docs/installation.md", Some("v3"));
        let git_url = to_git_url(&file).unwrap();
        assert_eq!(
            git_url.as_str(),
            "git://github.com/thefrontside/effection?ref=v3#docs%2Finstallation.md"
        );
        assert_eq!(parse_git_url(&git_url).unwrap(), file);
    }

    #[test]
    fn test_git_url_without_ref_has_no_query() {
        let file = repo_file("README.md", None);
        let git_url = to_git_url(&file).unwrap();
        assert_eq!(
            git_url.as_str(),
            "git://github.com/thefrontside/effection#README.md"
        );
        assert!(git_url.query().is_none());
        assert_eq!(parse_git_url(&git_url).unwrap(), file);
    }

    #[test]
    fn test_git_url_round_trip_percent_and_unicode() {
        // Paths containing '%', literal '/', and unicode must survive exactly.
        for path in ["a%2Fb/c.md", "100% done.md", "docs/ドキュメント.md", "a#b?c.md"] {
            let file = repo_file(path, Some("main"));
            let git_url = to_git_url(&file).unwrap();
            let parsed = parse_git_url(&git_url).expect(path);
            assert_eq!(parsed.path, path, "path must round-trip exactly");
        }
    }

    #[test]
    fn test_parse_git_url_rejects_malformed() {
        // Wrong scheme.
        assert!(parse_git_url(&url("https://github.com/a/b#x")).is_none());
        // Missing repo segment.
        assert!(parse_git_url(&url("git://github.com/onlyowner#x")).is_none());
        // Extra path segments.
        assert!(parse_git_url(&url("git://github.com/a/b/c#x")).is_none());
        // No fragment (no file path).
        assert!(parse_git_url(&url("git://github.com/a/b")).is_none());
        // Empty fragment.
        assert!(parse_git_url(&url("git://github.com/a/b#")).is_none());
    }
}
