//! The GitHub REST client adapter.
//!
//! Every API call is issued through the fetch capability rather than a raw
//! HTTP client, so repository metadata, tag listings, and content reads all
//! benefit from the response cache and the URL rewrite chain (a Contents API
//! call can be transparently served from a local checkout). This closes the
//! loop between structured GitHub access and the generic URL pipeline.

use crate::cancellation::CancellationToken;
use crate::errors::{Error, Result};
use crate::fetch::FetchCapability;
use crate::http::{Request, Response};
use crate::rewrite::encode_repo_path;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

const API_BASE: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";
const USER_AGENT_VALUE: &str = concat!("docpipe/", env!("CARGO_PKG_VERSION"));
const TAGS_PER_PAGE: usize = 100;

/// Repository metadata, primarily for resolving the default branch.
#[derive(Deserialize, Debug, Clone)]
pub struct Repo {
    /// Repository name.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// The branch served when no ref is given.
    pub default_branch: String,
    /// Repository description, if set.
    pub description: Option<String>,
}

/// A tag as returned by the tags listing endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct Tag {
    /// Tag name (e.g. `v3.0.0`).
    pub name: String,
    /// The commit the tag points at.
    pub commit: CommitRef,
}

/// Commit identity within a [`Tag`].
#[derive(Deserialize, Debug, Clone)]
pub struct CommitRef {
    /// Commit SHA.
    pub sha: String,
}

/// A resolved git reference.
#[derive(Deserialize, Debug, Clone)]
pub struct GitRef {
    /// Fully qualified ref name (e.g. `refs/tags/v3`).
    #[serde(rename = "ref")]
    pub full_ref: String,
    /// The object the ref points at.
    pub object: GitObject,
}

/// Target of a [`GitRef`].
#[derive(Deserialize, Debug, Clone)]
pub struct GitObject {
    /// Object SHA.
    pub sha: String,
    /// Object type (`commit`, `tag`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// GitHub REST client whose transport is the fetch capability.
///
/// Created once per process with an auth token and held for its lifetime; it
/// owns no connections of its own, only a reference to the pipeline.
pub struct GithubClient {
    fetch: Arc<FetchCapability>,
    auth: HeaderValue,
    cancel: CancellationToken,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("auth", &self.auth)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Creates the client.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the token cannot form a valid
    /// `Authorization` header.
    pub fn new(
        token: &str,
        fetch: Arc<FetchCapability>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            Error::Config("GITHUB_TOKEN contains characters not valid in a header".to_string())
        })?;
        auth.set_sensitive(true);
        Ok(Self {
            fetch,
            auth,
            cancel,
        })
    }

    fn api_url(&self, path_and_query: &str) -> Result<Url> {
        let input = format!("{}{}", API_BASE, path_and_query);
        Url::parse(&input).map_err(|source| Error::UrlParse { input, source })
    }

    fn request(&self, url: Url, accept: &'static str) -> Request {
        Request::get(url)
            .with_header(ACCEPT, HeaderValue::from_static(accept))
            .with_header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .with_header(AUTHORIZATION, self.auth.clone())
    }

    /// Issues a GET expecting a JSON payload; non-2xx becomes a typed error
    /// carrying the resource identity and status.
    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.fetch.invoke(self.request(url.clone(), ACCEPT_JSON)).await?;
        if !response.ok() {
            return Err(Error::UpstreamStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.json()
    }

    /// Fetches repository metadata (`GET /repos/{owner}/{repo}`).
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repo> {
        self.fetch_json(self.api_url(&format!("/repos/{}/{}", owner, repo))?)
            .await
    }

    /// Lists all tags (`GET /repos/{owner}/{repo}/tags`, paginated).
    ///
    /// Pages of 100 are requested until a short page arrives. The
    /// cancellation token is checked between pages, so a shutdown never
    /// issues another request for a long tag history.
    pub async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        for page in 1.. {
            if self.cancel.is_cancelled() {
                return Err(Error::Interrupted);
            }
            let url = self.api_url(&format!(
                "/repos/{}/{}/tags?per_page={}&page={}",
                owner, repo, TAGS_PER_PAGE, page
            ))?;
            let batch: Vec<Tag> = self.fetch_json(url).await?;
            let last_page = batch.len() < TAGS_PER_PAGE;
            tags.extend(batch);
            if last_page {
                break;
            }
        }
        log::debug!("listed {} tags for {}/{}", tags.len(), owner, repo);
        Ok(tags)
    }

    /// Fetches a file's raw content at a ref
    /// (`GET /repos/{owner}/{repo}/contents/{path}`, raw media type).
    ///
    /// Returns the pipeline `Response` unexamined: a 404 for missing content
    /// stays a response the caller can branch on, and the URL shape is exactly
    /// what the Contents API rewrite matches, so a configured local checkout
    /// takes over transparently.
    pub async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Response> {
        let mut url = self.api_url(&format!(
            "/repos/{}/{}/contents/{}",
            owner,
            repo,
            encode_repo_path(path)
        ))?;
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        self.fetch.invoke(self.request(url, ACCEPT_RAW)).await
    }

    /// Resolves a ref to its object
    /// (`GET /repos/{owner}/{repo}/git/ref/{ref}`).
    pub async fn get_ref(&self, owner: &str, repo: &str, git_ref: &str) -> Result<GitRef> {
        self.fetch_json(self.api_url(&format!("/repos/{}/{}/git/ref/{}", owner, repo, git_ref))?)
            .await
    }
}
