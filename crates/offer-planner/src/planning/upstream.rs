use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{info, warn};

/// Transport failure while talking to the external optimizer.
#[derive(Debug, thiserror::Error)]
#[error("optimizer backend unavailable: {0}")]
pub struct UpstreamUnavailable(#[from] reqwest::Error);

/// Upstream answer, passed back to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Client for the external optimizer that replaces the local engine when
/// configured. No retries and no timeout.
#[derive(Debug, Clone)]
pub struct UpstreamOptimizer {
    base_url: String,
    client: Client,
}

impl UpstreamOptimizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forwards a planning request to `{base}/optimize`.
    pub async fn optimize(&self, body: Bytes) -> Result<UpstreamReply, UpstreamUnavailable> {
        self.forward("optimize", body).await
    }

    /// Forwards a CSV export request to `{base}/optimize_csv`.
    pub async fn optimize_csv(&self, body: Bytes) -> Result<UpstreamReply, UpstreamUnavailable> {
        self.forward("optimize_csv", body).await
    }

    async fn forward(&self, path: &str, body: Bytes) -> Result<UpstreamReply, UpstreamUnavailable> {
        let url = format!("{}/{}", self.base_url, path);
        info!(%url, bytes = body.len(), "forwarding request to optimizer backend");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, "optimizer backend unreachable");
                UpstreamUnavailable(err)
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        info!(%url, status, "optimizer backend replied");
        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
