//! HTTP client utilities shared by the source adapters.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;
use crate::models::DownloadRequest;

/// Default per-request timeout for API calls.
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client with sensible defaults.
///
/// Each adapter owns one instance; there is no shared mutable state between
/// adapters beyond the connection pool inside reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the crate's user agent and default timeouts.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(API_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Stream a PDF to disk under the request's directory.
    ///
    /// Creates the directory if absent. The write is guarded so no corrupt
    /// artifact survives a failure: a transport error mid-stream or a
    /// zero-byte body deletes the partial file before the error propagates.
    ///
    /// Status mapping: 403 is an auth failure, 404 means the paper (or its
    /// PDF) does not exist, 429 is a quota violation, any other non-2xx is a
    /// retryable request failure.
    pub async fn download_pdf(
        &self,
        source: &str,
        url: &str,
        request: &DownloadRequest,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<PathBuf, ApiError> {
        tokio::fs::create_dir_all(&request.dirpath)
            .await
            .map_err(|e| {
                ApiError::request(
                    source,
                    "io_error",
                    format!("cannot create {}: {}", request.dirpath.display(), e),
                    false,
                )
            })?;

        let mut builder = self.client.get(url);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(source, &e))?;

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN => {
                return Err(ApiError::auth(
                    source,
                    "download_forbidden",
                    format!("download denied for {}", request.paper_id),
                )
                .with_status(403))
            }
            StatusCode::NOT_FOUND => {
                return Err(ApiError::response(
                    source,
                    "paper_not_found",
                    format!("no downloadable content for {}", request.paper_id),
                    false,
                )
                .with_status(404))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(ApiError::quota(
                    source,
                    "rate_limited",
                    "download rate limit exceeded",
                )
                .with_status(429))
            }
            s if !s.is_success() => {
                return Err(ApiError::request(
                    source,
                    "http_error",
                    format!("download returned HTTP {}", s.as_u16()),
                    true,
                )
                .with_status(s.as_u16()))
            }
            _ => {}
        }

        let path = request.target_path();
        let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
            ApiError::request(
                source,
                "io_error",
                format!("cannot create {}: {}", path.display(), e),
                false,
            )
        })?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(transport_error(source, &e));
                }
            };
            written += chunk.len() as u64;
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(ApiError::request(
                    source,
                    "io_error",
                    format!("write failed for {}: {}", path.display(), e),
                    false,
                ));
            }
        }
        file.flush().await.ok();
        drop(file);

        if written == 0 {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ApiError::response(
                source,
                "empty_download",
                format!("download for {} produced an empty file", request.paper_id),
                true,
            )
            .with_meta("url", Value::from(url)));
        }

        tracing::debug!(source, %written, path = %path.display(), "pdf written");
        Ok(path)
    }
}

/// Map a reqwest transport error (timeout, TLS, connect) to a retryable
/// request failure. Shared between adapters so timeouts classify uniformly.
pub fn transport_error(source: &str, err: &reqwest::Error) -> ApiError {
    let reason = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection_error"
    } else {
        "http_error"
    };
    let mut mapped = ApiError::request(source, reason, err.to_string(), true);
    if let Some(status) = err.status() {
        mapped = mapped.with_status(status.as_u16());
    }
    mapped
}
