//! Chat-completion upstream client.
//!
//! Sends one POST per advice request and hands back the upstream status and
//! raw body. The body is never parsed: callers relay it byte for byte.

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header;
use thiserror::Error;
use url::Url;

use crate::services::advice::ChatCompletionRequest;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// What the upstream answered, untouched.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Cheap to clone: `reqwest::Client` is reference counted inside.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: Url,
}

impl UpstreamClient {
    pub fn new(url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Single attempt, no retry and no client-side timeout.
    pub async fn complete(
        &self,
        api_key: &str,
        payload: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        let res = self
            .http
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        Ok(UpstreamReply { status, body })
    }
}
