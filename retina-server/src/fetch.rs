//! Outbound HTTP fetch collaborator
//!
//! All page and image downloads go through the [`HttpFetcher`] trait so the
//! pipeline can be exercised in tests without touching the network. The
//! production implementation wraps a shared `reqwest` client with a timeout;
//! a collaborator timeout surfaces as a [`FetchError`], never a hang.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// User agent sent on outbound fetches.
const USER_AGENT: &str = concat!("retina/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects to follow when fetching pages and images.
const MAX_REDIRECTS: usize = 5;

/// A fetched HTTP resource.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects.
    pub url: Url,
    /// Content-Type header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub bytes: Vec<u8>,
}

/// Errors fetching a remote page or image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or timed out.
    #[error("failed to fetch {url}: {message}")]
    Request { url: String, message: String },
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// The body could not be read.
    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Abstract fetch interface for pages and images.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch the resource at `url`, following redirects.
    async fn get(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Production fetcher backed by `reqwest`.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        tracing::debug!(url = %url, "fetching remote resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        tracing::debug!(
            url = %final_url,
            content_type = content_type.as_deref().unwrap_or("-"),
            size = bytes.len(),
            "fetched remote resource"
        );

        Ok(FetchedResource {
            url: final_url,
            content_type,
            bytes,
        })
    }
}
