//! Inference endpoint HTTP client (Databricks serving endpoint by default).

use crate::envelope::UpstreamRequest;
use reqwest::StatusCode;
use std::time::Duration;

/// Client for the inference endpoint. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    endpoint_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned {status}")]
    Status { status: StatusCode, body: String },
    #[error("upstream response was not valid JSON: {0}")]
    Decode(reqwest::Error),
    #[error("upstream request failed: {0}")]
    Request(reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e)
        } else {
            UpstreamError::Request(e)
        }
    }
}

impl UpstreamClient {
    pub fn new(endpoint_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// POST the message list; returns the upstream JSON body as-is.
    pub async fn invoke(
        &self,
        body: &UpstreamRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut req = self
            .client
            .post(&self.endpoint_url)
            .timeout(timeout)
            .json(body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        Ok(res.json().await?)
    }

    /// Send a single user message; used by the connection check.
    pub async fn probe(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, UpstreamError> {
        self.invoke(&UpstreamRequest::single(prompt), timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code() {
        let e = UpstreamError::Status {
            status: StatusCode::FORBIDDEN,
            body: "{\"error_code\":\"PERMISSION_DENIED\"}".to_string(),
        };
        assert_eq!(e.to_string(), "upstream returned 403 Forbidden");
    }

    #[test]
    fn new_keeps_url_and_token() {
        let c = UpstreamClient::new("http://127.0.0.1:1/invocations", None);
        assert_eq!(c.endpoint_url(), "http://127.0.0.1:1/invocations");
        assert!(!c.has_token());
        let c = UpstreamClient::new("http://x", Some("dapi".into()));
        assert!(c.has_token());
    }
}
