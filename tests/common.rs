// tests/common.rs
// Shared helpers for the integration tests.

use assert_cmd::Command;

/// Returns a `Command` for the docpipe binary with a clean, deterministic
/// environment: tests opt in to the variables they need.
pub fn docpipe_cmd() -> Command {
    let mut cmd = Command::cargo_bin("docpipe").expect("binary should build");
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("JSR_API")
        .env_remove("DOCPIPE_LOCAL_REPO");
    cmd
}
