//! Content store client
//!
//! Fetches operation documents by reference from the CDN endpoint. This
//! layer does no retries and no caching; both belong to the caller.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Header carrying the CDN access credential. Stable across the server and
/// test doubles.
pub const CDN_ACCESS_KEY_HEADER: &str = "X-Hive-CDN-Key";

/// Content store fetch failures
#[derive(Debug, Clone, Error)]
pub enum CdnError {
    /// Non-404 error status from the CDN
    #[error("CDN returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Network failure or timeout before a status was received
    #[error("CDN request failed: {0}")]
    Transport(String),
}

/// Authenticated HTTP client for the CDN content store
#[derive(Clone)]
pub struct CdnClient {
    http: reqwest::Client,
    endpoint: String,
    access_key: String,
}

impl CdnClient {
    /// Create a client for `endpoint`, authenticating with `access_key`.
    /// The timeout applies per fetch; on expiry the call fails as
    /// [`CdnError::Transport`].
    pub fn new(endpoint: &str, access_key: &str, timeout: Duration) -> Result<Self, CdnError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CdnError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
        })
    }

    /// Base URL this client fetches from
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch a document by reference (a bare content hash or a
    /// `client-name/client-version/hash` path)
    ///
    /// Returns `Ok(Some(text))` on 200 with the raw body, `Ok(None)` on
    /// 404, and an error for anything else.
    pub async fn fetch(&self, reference: &str) -> Result<Option<String>, CdnError> {
        let url = format!("{}/{}", self.endpoint, reference);
        debug!(%url, "Fetching persisted document");

        let response = self
            .http
            .get(&url)
            .header(CDN_ACCESS_KEY_HEADER, &self.access_key)
            .send()
            .await
            .map_err(|e| CdnError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| CdnError::Transport(e.to_string()))?;
                Ok(Some(body))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CdnError::Upstream {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
