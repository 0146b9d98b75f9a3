//! Defines the request/response model flowing through the fetch pipeline.
//!
//! The pipeline deals in its own [`Request`] and [`Response`] types rather than
//! `reqwest`'s, for two reasons:
//!
//! 1. Not every request reaches the network. `file:` URLs are answered from
//!    disk and cache hits are answered from the store, so responses must be
//!    constructible without an HTTP exchange.
//! 2. Cache discipline. A live HTTP body is a single-read stream; the default
//!    fetch implementation buffers it into [`bytes::Bytes`] exactly once, after
//!    which cloning a `Response` (to store one copy and return the other) is a
//!    reference-count bump and neither copy can ever be an exhausted stream.

use crate::errors::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// A normalized request identity plus payload.
///
/// Equivalent inputs (a string URL, a parsed [`Url`], a prebuilt `Request`)
/// normalize to the same shape so cache keys match across call sites.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a request with the given method and URL and no headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a GET request for the given URL.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Parses `input` as a URL and creates a GET request for it.
    pub fn get_str(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|source| Error::UrlParse {
            input: input.to_string(),
            source,
        })?;
        Ok(Self::get(url))
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Replaces the request URL (used by the rewrite step).
    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Computes the cache key for this request.
    ///
    /// Only GET requests are cacheable; everything else returns `None` and
    /// must bypass the cache entirely. The key is derived from the parsed
    /// (and therefore normalized) URL, so `HTTPS://HOST:443/a` and
    /// `https://host/a` key identically.
    ///
    /// The Accept header is part of the key: content negotiation means one
    /// URL can name several representations (the GitHub Contents API answers
    /// with raw bytes or JSON metadata depending on Accept), and those must
    /// not share a cache entry.
    pub fn cache_key(&self) -> Option<String> {
        if self.method != Method::GET {
            return None;
        }
        let mut key = format!("{} {}", self.method, self.url);
        if let Some(accept) = self.headers.get(ACCEPT).and_then(|v| v.to_str().ok()) {
            key.push_str(" accept:");
            key.push_str(accept);
        }
        Some(key)
    }
}

impl From<Url> for Request {
    fn from(url: Url) -> Self {
        Request::get(url)
    }
}

/// A buffered response produced by the fetch pipeline.
///
/// The body is fully buffered; [`Response::clone`] produces an independent,
/// fully readable copy. Consuming accessors ([`bytes`](Self::bytes),
/// [`text`](Self::text), [`json`](Self::json)) take `self` by value to mirror
/// the read-once discipline of the callers.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: StatusCode, url: Url) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url,
            body: Bytes::new(),
        }
    }

    /// Sets the response body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Builds a 404 response with a descriptive plain-text body.
    ///
    /// Missing content is an expected condition for documentation lookups and
    /// is never raised as an error; callers branch on [`ok`](Self::ok).
    pub fn not_found(url: Url, message: impl Into<String>) -> Self {
        Self::plain_text(StatusCode::NOT_FOUND, url, message)
    }

    /// Builds a 500 response with a descriptive plain-text body.
    pub fn internal_error(url: Url, message: impl Into<String>) -> Self {
        Self::plain_text(StatusCode::INTERNAL_SERVER_ERROR, url, message)
    }

    fn plain_text(status: StatusCode, url: Url, message: impl Into<String>) -> Self {
        Self::new(status, url)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body(message.into())
    }

    /// Buffers a live `reqwest` response into a pipeline response.
    ///
    /// This is the only place a network body stream is consumed; everything
    /// downstream (cache, callers) sees cheaply cloneable buffered bytes.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            status,
            headers,
            url,
            body,
        })
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` if the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The final URL this response was produced for (post-rewrite).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The body length in bytes.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Consumes the response, returning the raw body bytes.
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Consumes the response, decoding the body as UTF-8 text.
    pub fn text(self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Decode {
            url: self.url.to_string(),
            reason: format!("invalid UTF-8: {}", e),
        })
    }

    /// Consumes the response, decoding the body as JSON.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode {
            url: self.url.to_string(),
            reason: format!("invalid JSON: {}", e),
        })
    }
}
