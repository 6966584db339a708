//! # Transport Client
//!
//! The single place outbound HTTP is configured: base address, default
//! headers and timeout. Every failure that leaves this module is already a
//! [`NormalizedError`].
//!
//! The client is an owned value handed to whoever needs it (see
//! [`UploadService`](super::upload::UploadService)); there is no process-wide
//! instance.

use anyhow::Result;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

use crate::common::config::{normalize_base_url, DEFAULT_BACKEND_URL};
use crate::common::error::NormalizedError;

/// Timeout applied when a request sets none of its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct TransportClient {
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl TransportClient {
    /// Build a client for `base_url` with `timeout` as the per-request upper bound.
    ///
    /// `Content-Type: application/json` is sent by default; requests that set
    /// their own content type (multipart uploads) keep theirs.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: normalize_base_url(base_url),
            timeout,
            http,
        })
    }

    /// Client for the default backend origin and timeout.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path`, optionally bounded tighter than the client's timeout.
    pub async fn get(&self, path: &str, timeout: Option<Duration>) -> Result<Response, NormalizedError> {
        let url = self.url(path);
        self.send(self.http.get(&url), &url, timeout).await
    }

    /// `POST path` with a multipart body.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        timeout: Option<Duration>,
    ) -> Result<Response, NormalizedError> {
        let url = self.url(path);
        self.send(self.http.post(&url).multipart(form), &url, timeout)
            .await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<Response, NormalizedError> {
        let request = match timeout {
            Some(t) => request.timeout(t),
            None => request,
        };
        debug!("→ {}", url);
        request.send().await.map_err(|e| {
            let normalized = NormalizedError::from_reqwest(&e);
            error!("❌ Request to {} failed ({}): {}", url, normalized.kind, e);
            normalized
        })
    }

    /// Read a response as JSON.
    ///
    /// A non-2xx answer becomes a backend error carrying the peer's status and
    /// its `error` message. A 2xx answer that is not JSON is an unknown error.
    pub async fn read_json(response: Response) -> Result<Value, NormalizedError> {
        let status = response.status();
        let url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NormalizedError::from_reqwest(&e))?;

        if !status.is_success() {
            let body = parse_error_body(&bytes);
            let err = NormalizedError::backend(status.as_u16(), body);
            warn!("⚠️ {} answered {}: {}", url, status.as_u16(), err.message);
            return Err(err);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("❌ {} returned a body that is not JSON: {}", url, e);
            NormalizedError::unknown(format!("response is not valid JSON: {}", e))
        })
    }
}

/// Error bodies are JSON by convention; plain text is kept as a string.
fn parse_error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok().or_else(|| {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        (!text.is_empty()).then_some(Value::String(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let client = TransportClient::new("http://localhost:5000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
        assert_eq!(client.url("api/ocr/process"), "http://localhost:5000/api/ocr/process");
    }

    #[test]
    fn test_defaults() {
        let client = TransportClient::with_defaults().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BACKEND_URL);
        assert_eq!(client.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_error_body() {
        assert_eq!(parse_error_body(b""), None);
        assert_eq!(
            parse_error_body(br#"{"error":"low confidence"}"#),
            Some(json!({ "error": "low confidence" }))
        );
        assert_eq!(
            parse_error_body(b"Bad Gateway\n"),
            Some(Value::String("Bad Gateway".to_string()))
        );
    }
}
