//! Defines the core `Config` struct and its builder.
//!
//! Configuration is resolved once at startup (from the environment, the CLI,
//! or programmatically via [`ConfigBuilder`]) and then handed by reference to
//! the pipeline bootstrap. A missing GitHub token is a fatal configuration
//! error raised here, before any request is served.

use crate::errors::{Error, Result};
use crate::rewrite::RewritePredicate;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Environment variable holding the GitHub personal access token (required).
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the JSR API base URL (optional).
pub const ENV_JSR_API: &str = "JSR_API";
/// Environment variable pointing at a local checkout to serve rewritten
/// GitHub content from (optional; enables the `git:` → `file:` rewrite).
pub const ENV_LOCAL_REPO: &str = "DOCPIPE_LOCAL_REPO";

/// Resolved application configuration.
pub struct Config {
    /// GitHub personal access token used by the client adapter.
    pub github_token: String,
    /// Base URL of the JSR API, when score lookups are enabled.
    pub jsr_api: Option<Url>,
    /// Local checkout directory; when set, both rewrite interceptors are
    /// registered and matching content is served from disk.
    pub local_repo: Option<PathBuf>,
    /// Predicate deciding which Contents API URLs the rewrite chain claims.
    pub rewrite_predicate: RewritePredicate,
}

// Custom Debug implementation: the token is a secret and the predicate is an
// opaque closure.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &"<redacted>")
            .field("jsr_api", &self.jsr_api)
            .field("local_repo", &self.local_repo)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Builds configuration from the process environment.
    ///
    /// `GITHUB_TOKEN` is required; `JSR_API` and `DOCPIPE_LOCAL_REPO` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        let mut builder = ConfigBuilder::new();

        match env::var(ENV_GITHUB_TOKEN) {
            Ok(token) if !token.is_empty() => {
                builder = builder.github_token(token);
            }
            _ => {
                return Err(Error::Config(format!(
                    "the {} environment variable is required",
                    ENV_GITHUB_TOKEN
                )))
            }
        }

        if let Ok(raw) = env::var(ENV_JSR_API) {
            let url = Url::parse(&raw).map_err(|e| {
                Error::Config(format!("{} is not a valid URL ('{}'): {}", ENV_JSR_API, raw, e))
            })?;
            builder = builder.jsr_api(url);
        }

        if let Ok(path) = env::var(ENV_LOCAL_REPO) {
            builder = builder.local_repo(path);
        }

        builder.build()
    }
}

/// Builder for [`Config`].
///
/// # Examples
///
/// ```
/// use docpipe::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .github_token("ghp_example")
///     .build()
///     .unwrap();
/// assert!(config.local_repo.is_none());
/// ```
#[derive(Default)]
pub struct ConfigBuilder {
    github_token: Option<String>,
    jsr_api: Option<Url>,
    local_repo: Option<PathBuf>,
    rewrite_predicate: Option<RewritePredicate>,
}

impl ConfigBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the GitHub token (required).
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Sets the JSR API base URL.
    pub fn jsr_api(mut self, url: Url) -> Self {
        self.jsr_api = Some(url);
        self
    }

    /// Sets the local checkout directory.
    pub fn local_repo(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repo = Some(path.into());
        self
    }

    /// Sets the Contents API rewrite predicate. Defaults to claiming every
    /// matching URL when a local checkout is configured.
    pub fn rewrite_predicate(mut self, predicate: RewritePredicate) -> Self {
        self.rewrite_predicate = Some(predicate);
        self
    }

    /// Validates and produces the final [`Config`].
    pub fn build(self) -> Result<Config> {
        let github_token = self
            .github_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("a GitHub token is required".to_string()))?;

        // file: URLs need absolute paths; resolve a relative checkout against
        // the working directory once, here, instead of on every rewrite.
        let local_repo = match self.local_repo {
            Some(path) if path.is_relative() => {
                let cwd = env::current_dir().map_err(|e| crate::errors::io_error_with_path(e, "."))?;
                Some(cwd.join(path))
            }
            other => other,
        };

        let rewrite_predicate = self
            .rewrite_predicate
            .unwrap_or_else(|| Arc::new(|_| true));

        Ok(Config {
            github_token,
            jsr_api: self.jsr_api,
            local_repo,
            rewrite_predicate,
        })
    }
}
