// tests/cli.rs
// End-to-end tests of the docpipe binary. Nothing here touches the network:
// content is served from file: URLs and local checkouts.

mod common;

use common::docpipe_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;
use url::Url;

#[test]
fn test_help_describes_the_tool() -> Result<(), Box<dyn std::error::Error>> {
    docpipe_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("interceptor chain"));
    Ok(())
}

#[test]
fn test_missing_github_token_fails_fast() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration failure must abort before any fetch is attempted, even
    // for a URL that would never need the token.
    docpipe_cmd()
        .arg("file:///tmp/whatever.md")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
    Ok(())
}

#[test]
fn test_fetches_a_local_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("guide.md");
    fs::write(&path, "# Guide\ncontent line\n")?;
    let url = Url::from_file_path(&path).unwrap();

    docpipe_cmd()
        .env("GITHUB_TOKEN", "dummy-token")
        .arg(url.as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("# Guide"));

    temp.close()?;
    Ok(())
}

#[test]
fn test_missing_file_reports_404_and_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let url = Url::from_file_path(temp.path().join("absent.md")).unwrap();

    docpipe_cmd()
        .env("GITHUB_TOKEN", "dummy-token")
        .arg(url.as_str())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("404"));

    temp.close()?;
    Ok(())
}

#[test]
fn test_include_headers_prints_status_line() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("a.md");
    fs::write(&path, "body")?;
    let url = Url::from_file_path(&path).unwrap();

    docpipe_cmd()
        .env("GITHUB_TOKEN", "dummy-token")
        .arg("-i")
        .arg(url.as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("200 OK"))
        .stdout(predicate::str::contains("content-type"));

    temp.close()?;
    Ok(())
}

#[test]
fn test_contents_url_served_from_local_checkout_flag() -> Result<(), Box<dyn std::error::Error>> {
    let checkout = tempdir()?;
    fs::create_dir_all(checkout.path().join("docs"))?;
    fs::write(checkout.path().join("docs/installation.md"), "# Install\n")?;

    docpipe_cmd()
        .env("GITHUB_TOKEN", "dummy-token")
        .arg("--local-repo")
        .arg(checkout.path())
        .arg("https://api.github.com/repos/thefrontside/effection/contents/docs%2Finstallation.md?ref=v3")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Install"));

    checkout.close()?;
    Ok(())
}

#[test]
fn test_output_writes_body_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let source = temp.path().join("in.md");
    let dest = temp.path().join("out.md");
    fs::write(&source, "written through -o")?;
    let url = Url::from_file_path(&source).unwrap();

    docpipe_cmd()
        .env("GITHUB_TOKEN", "dummy-token")
        .arg("-o")
        .arg(&dest)
        .arg(url.as_str())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&dest)?, "written through -o");
    temp.close()?;
    Ok(())
}
