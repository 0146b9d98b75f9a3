//! Serves `file:` URLs from the local filesystem.

use crate::errors::Result;
use crate::http::{Request, Response};
use crate::intercept::{Interceptor, Next};
use futures::future::BoxFuture;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::io::ErrorKind;
use std::path::Path;

/// Interceptor answering `file:` requests from disk; other schemes delegate.
///
/// File I/O failures never propagate as raw errors from this layer: a missing
/// file becomes a 404 response and anything else becomes a logged 500. A
/// missing doc or asset for one symbol must not take down the whole page
/// render.
pub struct FileReader;

impl FileReader {
    async fn read(path: &Path, request: &Request) -> Response {
        let url = request.url().clone();
        match tokio::fs::read(path).await {
            Ok(data) => {
                let mut response = Response::new(StatusCode::OK, url).with_body(data);
                if let Ok(mime) = HeaderValue::from_str(
                    mime_guess::from_path(path).first_or_octet_stream().as_ref(),
                ) {
                    response = response.with_header(CONTENT_TYPE, mime);
                }
                response
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("local file not found: {}", path.display());
                Response::not_found(url, format!("no such file: {}", path.display()))
            }
            Err(e) => {
                log::error!("failed to read '{}': {}", path.display(), e);
                Response::internal_error(url, format!("failed to read {}", path.display()))
            }
        }
    }
}

impl Interceptor<Request, Response> for FileReader {
    fn around<'a>(
        &'a self,
        request: Request,
        next: Next<'a, Request, Response>,
    ) -> BoxFuture<'a, Result<Response>> {
        if request.url().scheme() != "file" {
            return next.run(request);
        }
        Box::pin(async move {
            match request.url().to_file_path() {
                Ok(path) => Ok(Self::read(&path, &request).await),
                Err(()) => {
                    log::warn!("unresolvable file URL: {}", request.url());
                    Ok(Response::not_found(
                        request.url().clone(),
                        "file URL has no local path",
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::Capability;
    use std::fs;
    use tempfile::tempdir;
    use url::Url;

    fn file_capability() -> Capability<Request, Response> {
        let mut capability = Capability::new("fetch", |request: Request| {
            Box::pin(async move {
                panic!("request for {} fell through the file reader", request.url())
            })
        });
        capability.register(FileReader);
        capability
    }

    #[tokio::test]
    async fn test_existing_file_is_served_with_content_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("installation.md");
        fs::write(&path, "# Installation").unwrap();

        let capability = file_capability();
        let url = Url::from_file_path(&path).unwrap();
        let response = capability.invoke(Request::get(url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/markdown"
        );
        assert_eq!(response.text().unwrap(), "# Installation");
    }

    #[tokio::test]
    async fn test_missing_file_yields_404_response_not_error() {
        let dir = tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("nope.md")).unwrap();

        let capability = file_capability();
        let response = capability.invoke(Request::get(url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.text().unwrap().contains("no such file"));
    }

    #[tokio::test]
    async fn test_unreadable_path_yields_500_response() {
        // Reading a directory as a file fails with something other than
        // NotFound on every supported platform.
        let dir = tempdir().unwrap();
        let url = Url::from_file_path(dir.path()).unwrap();

        let capability = file_capability();
        let response = capability.invoke(Request::get(url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
