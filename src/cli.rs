//! Defines the command-line interface using `clap`.

use clap::Parser;
use std::path::PathBuf;

/// Fetch content through the docpipe interceptor chain.
///
/// Resolves a logical URL (an `https:` resource, a GitHub Contents API URL, a
/// `git:` pseudo-URL, or a `file:` path) through URL rewriting and the
/// response cache, and prints the body. Requires the GITHUB_TOKEN environment
/// variable.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The URL to fetch.
    pub url: String,

    /// Serve matching GitHub content from this local checkout instead of the
    /// network.
    #[arg(long, env = "DOCPIPE_LOCAL_REPO", value_name = "DIR")]
    pub local_repo: Option<PathBuf>,

    /// Print the response status and headers before the body.
    #[arg(short = 'i', long)]
    pub include_headers: bool,

    /// Write the body to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_accepts_url_and_flags() {
        let cli = Cli::parse_from([
            "docpipe",
            "-i",
            "--local-repo",
            "/tmp/checkout",
            "https://example.com/a",
        ]);
        assert_eq!(cli.url, "https://example.com/a");
        assert!(cli.include_headers);
        assert_eq!(cli.local_repo.unwrap(), PathBuf::from("/tmp/checkout"));
    }
}
