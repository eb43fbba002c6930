//! Gateway error taxonomy.

use thiserror::Error;

use crate::crypto::CipherError;
use crate::security::{AuthFailure, DenyReason};
use crate::upstream::UpstreamError;

/// Every way a signin request can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Turned away by the admission limiter.
    #[error("Rate limited ({})", .0.as_str())]
    RateLimited(DenyReason),

    /// Bearer authentication failed.
    #[error("Authentication failed ({})", .0.as_str())]
    Unauthorized(AuthFailure),

    /// Namespace, database, user or password missing after applying defaults.
    #[error("Invalid credentials: {0} is empty")]
    InvalidCredentials(&'static str),

    /// Request body could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Upstream signin failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Encrypting the response failed.
    #[error("Encryption failed: {0}")]
    Cipher(#[from] CipherError),
}

impl GatewayError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited(_) => "rate_limited",
            GatewayError::Unauthorized(_) => "unauthorized",
            GatewayError::InvalidCredentials(_) => "invalid_credentials",
            GatewayError::InvalidBody(_) => "invalid_body",
            GatewayError::Upstream(_) => "upstream_error",
            GatewayError::Cipher(_) => "cipher_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::RateLimited(DenyReason::Lockout);
        assert_eq!(err.to_string(), "Rate limited (lockout)");

        let err = GatewayError::Unauthorized(AuthFailure::Malformed);
        assert_eq!(err.to_string(), "Authentication failed (malformed)");

        let err = GatewayError::from(UpstreamError::Status(500));
        assert_eq!(err.to_string(), "Upstream returned status 500");
        assert_eq!(err.kind(), "upstream_error");
    }
}
