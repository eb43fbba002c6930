//! Upstream database signin.
//!
//! # Responsibilities
//! - POST `{ns, db, user, pass}` to `{protocol}://{host}/signin`
//! - Extract the `token` string from the JSON response
//! - Bound every call with a timeout
//!
//! # Design Decisions
//! - The database protocol is opaque: one HTTP call returning a token
//! - No retries here; the caller decides
//! - `SigninClient` is a trait so the orchestrator can be tested without a network

pub mod client;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::HttpSigninClient;

/// Credentials forwarded to the upstream signin endpoint.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    pub ns: String,
    pub db: String,
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for SigninRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigninRequest")
            .field("ns", &self.ns)
            .field("db", &self.db)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// Errors from the upstream signin call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The signin URL could not be built from configuration.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// Connection or transport failure.
    #[error("Upstream request failed: {0}")]
    Request(String),

    /// The call did not complete in time.
    #[error("Upstream timeout after {0} seconds")]
    Timeout(u64),

    /// Upstream answered with a non-200 status.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Response body was not JSON.
    #[error("Upstream response could not be decoded: {0}")]
    Decode(String),

    /// Response JSON had no string `token` field.
    #[error("Upstream response contained no token")]
    MissingToken,
}

impl UpstreamError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidUrl(_) => "invalid_url",
            UpstreamError::Request(_) => "request",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status(_) => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::MissingToken => "missing_token",
        }
    }
}

/// Something that can exchange credentials for a token.
#[async_trait]
pub trait SigninClient: Send + Sync {
    async fn sign_in(&self, request: &SigninRequest) -> Result<String, UpstreamError>;
}
