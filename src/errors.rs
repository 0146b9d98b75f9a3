//! Defines application-specific error types.
//!
//! This module provides the `Error` enum, which categorizes the failures that
//! can occur while resolving content through the fetch pipeline, offering more
//! context than generic I/O or `anyhow` errors.
//!
//! Note that "expected" failure conditions (a missing local file, missing
//! remote content) are *not* errors at all: they surface as `Response` values
//! with a 404 status so that callers can recover (e.g. render a "no docs
//! available" placeholder). Only transport, decode, and configuration failures
//! travel through this enum.

use thiserror::Error;

/// Application-specific errors used throughout `docpipe`.
#[derive(Error, Debug)]
pub enum Error {
    // --- Configuration Errors ---
    /// Invalid or missing configuration (e.g. no `GITHUB_TOKEN`). Fatal at
    /// startup, before any request is served.
    #[error("Invalid configuration: {0}")]
    Config(String),

    // --- Upstream Errors ---
    /// A remote endpoint answered with a non-success status where a typed
    /// payload was required (repository metadata, tags, refs).
    #[error("Upstream request to '{url}' failed with status {status}")]
    UpstreamStatus {
        /// The URL of the failed request.
        url: String,
        /// The HTTP status code returned by the upstream.
        status: u16,
    },

    /// The HTTP transport itself failed (connection refused, TLS, timeout).
    #[error("HTTP transport error for '{url}': {source}")]
    Http {
        /// The URL that was being fetched.
        url: String,
        /// The underlying `reqwest` error.
        #[source]
        source: reqwest::Error,
    },

    /// A request reached the default fetch implementation with a scheme it
    /// cannot serve. Indicates a mis-assembled interceptor chain.
    #[error("No fetch handler for URL scheme '{scheme}' ('{url}')")]
    UnsupportedScheme {
        /// The scheme of the offending URL.
        scheme: String,
        /// The full URL.
        url: String,
    },

    // --- Decode Errors ---
    /// A response body could not be decoded as the expected representation
    /// (UTF-8 text or a JSON payload).
    #[error("Failed to decode response from '{url}': {reason}")]
    Decode {
        /// The URL whose response failed to decode.
        url: String,
        /// A human-readable description of the decode failure.
        reason: String,
    },

    // --- URL Errors ---
    /// A caller-supplied string could not be parsed as a URL.
    #[error("Invalid URL '{input}': {source}")]
    UrlParse {
        /// The string that failed to parse.
        input: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    // --- I/O Errors ---
    /// Error occurring during file access outside the `file:` response path
    /// (which converts its own failures into 404/500 responses).
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        /// The path that caused the I/O error.
        path: String, // Use String to avoid lifetime issues if PathBuf is dropped
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    // --- Signal Handling ---
    /// The operation was cancelled (e.g., Ctrl+C) between suspension points.
    #[error("Operation cancelled")]
    Interrupted,
}

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create an `Error::Io` with path context.
pub fn io_error_with_path<P: AsRef<std::path::Path>>(source: std::io::Error, path: P) -> Error {
    Error::Io {
        path: path.as_ref().display().to_string(),
        source,
    }
}
