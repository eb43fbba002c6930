//! HTTP signin client with timeout and error handling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::{SigninClient, SigninRequest, UpstreamError};

/// reqwest-backed [`SigninClient`].
#[derive(Clone)]
pub struct HttpSigninClient {
    client: Client,
    signin_url: Url,
    timeout: Duration,
}

impl HttpSigninClient {
    /// Create a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let signin_url = signin_url(config)?;
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        tracing::info!(url = %signin_url, timeout_secs = timeout.as_secs(), "Upstream signin client initialized");

        Ok(Self {
            client,
            signin_url,
            timeout,
        })
    }

    pub fn signin_url(&self) -> &Url {
        &self.signin_url
    }
}

/// Build `{protocol}://{host}[:{port}]/signin`.
pub fn signin_url(config: &UpstreamConfig) -> Result<Url, UpstreamError> {
    let raw = format!("{}://{}/signin", config.protocol, config.authority());
    Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl(format!("'{}': {}", raw, e)))
}

#[async_trait]
impl SigninClient for HttpSigninClient {
    async fn sign_in(&self, request: &SigninRequest) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(self.signin_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(self.timeout.as_secs())
                } else {
                    UpstreamError::Request(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.without_url().to_string()))?;

        body.get("token")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or(UpstreamError::MissingToken)
    }
}
