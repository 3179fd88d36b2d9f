//! Blocking text fetches for stylesheets and the converter engine.
//!
//! `http://`/`https://` references go through a blocking reqwest client,
//! `file://` references are read from disk. Anything else is rejected.

use std::mem::ManuallyDrop;
use std::time::Duration;
use thiserror::Error;

/// Maximum response body size (10 MB).
const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Scheme \"{scheme}\" is not fetchable")]
    UnsupportedScheme { scheme: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Response body exceeds maximum size ({size} bytes, limit is 10 MB)")]
    TooLarge { size: usize },

    #[error("Resource {url} is not valid UTF-8 text")]
    NotText { url: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches a resource and returns its body as text.
///
/// Implementations block the calling thread until the body is available or the
/// transport gives up.
pub trait ResourceFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for std::sync::Arc<T> {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url)
    }
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Default fetcher: blocking reqwest for http(s), filesystem for `file://`.
///
/// One client is built per fetcher and reused for every request, so
/// connections to the same stylesheet host are pooled.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Wrapped in ManuallyDrop because reqwest::blocking::Client owns an internal
    /// tokio runtime that panics on drop inside another runtime. Fetchers live
    /// as long as their panel, so never dropping the client is harmless.
    client: ManuallyDrop<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5));
        // Build on a separate OS thread: the blocking client starts its own
        // runtime, which panics when constructed inside an existing async context.
        let client = std::thread::spawn(move || builder.build())
            .join()
            .map_err(|_| FetchError::Http("HTTP client construction thread panicked".into()))?
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client: ManuallyDrop::new(client),
        })
    }

    fn fetch_http(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Http(format!("Failed to read response body: {e}")))?;

        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge { size: body.len() });
        }

        String::from_utf8(body.to_vec()).map_err(|_| FetchError::NotText {
            url: url.to_string(),
        })
    }

    fn fetch_file(&self, parsed: &url::Url) -> Result<String, FetchError> {
        let path = parsed.to_file_path().map_err(|_| FetchError::InvalidUrl {
            url: parsed.to_string(),
            reason: "not a local file path".into(),
        })?;
        let bytes = std::fs::read(&path).map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| FetchError::NotText {
            url: parsed.to_string(),
        })
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => self.fetch_http(url),
            "file" => self.fetch_file(&parsed),
            scheme => Err(FetchError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_http_body_as_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/theme.css")
            .with_status(200)
            .with_header("content-type", "text/css")
            .with_body("body { color: red; }")
            .create();

        let body = HttpFetcher::new()
            .unwrap()
            .fetch_text(&format!("{}/theme.css", server.url()))
            .unwrap();
        assert_eq!(body, "body { color: red; }");
        mock.assert();
    }

    #[test]
    fn error_status_is_a_failure() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.css").with_status(404).create();

        let err = HttpFetcher::new()
            .unwrap()
            .fetch_text(&format!("{}/missing.css", server.url()))
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn binary_body_is_not_text() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/blob")
            .with_status(200)
            .with_body(vec![0xff, 0xfe, 0x00, 0x80])
            .create();

        let err = HttpFetcher::new()
            .unwrap()
            .fetch_text(&format!("{}/blob", server.url()))
            .unwrap_err();
        assert!(matches!(err, FetchError::NotText { .. }));
    }

    #[test]
    fn reads_file_urls_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("local.css");
        std::fs::write(&path, "p { margin: 0; }").unwrap();
        let url = url::Url::from_file_path(&path).unwrap();

        let body = HttpFetcher::new().unwrap().fetch_text(url.as_str()).unwrap();
        assert_eq!(body, "p { margin: 0; }");
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let err = HttpFetcher::new()
            .unwrap()
            .fetch_text("file:///definitely/not/here.css")
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn rejects_unsupported_schemes() {
        let err = HttpFetcher::new().unwrap().fetch_text("ftp://example.com/a.css").unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { .. }));

        let err = HttpFetcher::new().unwrap().fetch_text("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn one_fetcher_serves_repeated_requests() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/theme.css")
            .with_status(200)
            .with_body("a { color: blue; }")
            .expect(2)
            .create();

        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(5)).unwrap();
        let url = format!("{}/theme.css", server.url());
        assert_eq!(fetcher.fetch_text(&url).unwrap(), "a { color: blue; }");
        assert_eq!(fetcher.clone().fetch_text(&url).unwrap(), "a { color: blue; }");
        mock.assert();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn usable_and_droppable_inside_async_runtime() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/async.css")
            .with_status(200)
            .with_body("em { font-style: italic; }")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch_text(&format!("{}/async.css", server.url()))
            .unwrap();
        drop(fetcher);

        assert_eq!(body, "em { font-style: italic; }");
        mock.assert_async().await;
    }
}
