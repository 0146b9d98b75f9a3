//! Optional JSR registry client for package score cards.
//!
//! The score card is a nicety, not a requirement: when no `JSR_API` base URL
//! is configured, lookups return `Ok(None)` and the feature degrades
//! gracefully instead of failing page renders.

use crate::errors::{Error, Result};
use crate::fetch::FetchCapability;
use crate::http::Request;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Package metadata relevant to the score card.
#[derive(Deserialize, Debug, Clone)]
pub struct PackageScore {
    /// Package name.
    pub name: String,
    /// Quality score in percent, when JSR has computed one.
    pub score: Option<u32>,
}

/// Client for the JSR package API, routed through the fetch pipeline (so
/// score lookups are cached like everything else).
pub struct JsrClient {
    base: Option<Url>,
    fetch: Arc<FetchCapability>,
}

impl JsrClient {
    /// Creates the client. `base` is the configured `JSR_API` endpoint, or
    /// `None` to disable score lookups.
    pub fn new(base: Option<Url>, fetch: Arc<FetchCapability>) -> Self {
        Self { base, fetch }
    }

    /// Whether a JSR endpoint is configured.
    pub fn is_configured(&self) -> bool {
        self.base.is_some()
    }

    /// Looks up the score for `@{scope}/{name}`.
    ///
    /// Returns `Ok(None)` when no endpoint is configured or when the registry
    /// answers with a non-success status; only transport and decode failures
    /// are errors.
    pub async fn score(&self, scope: &str, name: &str) -> Result<Option<PackageScore>> {
        let Some(base) = &self.base else {
            log::debug!("JSR_API not configured; skipping score lookup");
            return Ok(None);
        };

        // A bare-origin base serializes with a trailing slash; trim it so the
        // joined path has no empty segment.
        let input = format!(
            "{}/scopes/{}/packages/{}",
            base.as_str().trim_end_matches('/'),
            scope,
            name
        );
        let url = Url::parse(&input).map_err(|source| Error::UrlParse { input, source })?;
        let request =
            Request::get(url.clone()).with_header(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self.fetch.invoke(request).await?;
        if !response.ok() {
            log::warn!(
                "JSR score lookup for @{}/{} failed with status {}",
                scope,
                name,
                response.status()
            );
            return Ok(None);
        }
        response.json().map(Some)
    }
}
