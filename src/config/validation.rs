//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject missing secrets: there is no default bearer secret or key
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::GatewayConfig;
use crate::crypto::CipherKey;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.security.bearer_secret.trim().is_empty() {
        errors.push(ValidationError::new(
            "security.bearer_secret",
            "must be set (JWT_SECRET)",
        ));
    }

    if config.security.encryption_key.is_empty() {
        errors.push(ValidationError::new(
            "security.encryption_key",
            "must be set (ENCRYPTION_KEY)",
        ));
    } else if let Err(e) = CipherKey::parse(&config.security.encryption_key) {
        errors.push(ValidationError::new("security.encryption_key", e.to_string()));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path must both be set",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    let admission = &config.admission;
    if admission.max_requests_per_minute == 0 {
        errors.push(ValidationError::new("admission.max_requests_per_minute", "must be > 0"));
    }
    if admission.max_failed_attempts == 0 {
        errors.push(ValidationError::new("admission.max_failed_attempts", "must be > 0"));
    }
    if admission.window_secs == 0 {
        errors.push(ValidationError::new("admission.window_secs", "must be > 0"));
    }
    if admission.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("admission.sweep_interval_secs", "must be > 0"));
    }

    let upstream = &config.upstream;
    if upstream.host.trim().is_empty() {
        errors.push(ValidationError::new("upstream.host", "must be set (DB_HOST)"));
    }
    if upstream.protocol != "https" && upstream.protocol != "http" {
        errors.push(ValidationError::new(
            "upstream.protocol",
            format!("unsupported scheme '{}'", upstream.protocol),
        ));
    }
    if !upstream.port.is_empty() && upstream.port.parse::<u16>().is_err() {
        errors.push(ValidationError::new(
            "upstream.port",
            format!("'{}' is not a port number", upstream.port),
        ));
    }
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
