//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the credential gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-client admission limits.
    pub admission: AdmissionConfig,

    /// Upstream signin endpoint and default credentials.
    pub upstream: UpstreamConfig,

    /// Bearer secret, encryption key and request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Admission limiter thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Requests admitted per client within one window.
    pub max_requests_per_minute: u32,

    /// Failed authentications before a client is locked out.
    pub max_failed_attempts: u32,

    /// Length of the request-volume window in seconds.
    pub window_secs: u64,

    /// Lockout applied once the failure threshold is met, in seconds.
    pub lockout_secs: u64,

    /// Records idle longer than this are evicted by the sweeper.
    pub idle_ttl_secs: u64,

    /// How often the sweeper runs.
    pub sweep_interval_secs: u64,
}

impl AdmissionConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn lockout(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }

    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: 60,
            max_failed_attempts: 3,
            window_secs: 60,
            lockout_secs: 60,
            idle_ttl_secs: 600,
            sweep_interval_secs: 60,
        }
    }
}

/// Upstream signin endpoint and the credentials used when a request omits them.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream host (e.g., "db.example.com").
    pub host: String,

    /// Optional port appended to the host.
    pub port: String,

    /// URL scheme for the signin call.
    pub protocol: String,

    /// Default namespace.
    pub ns: String,

    /// Default database.
    pub db: String,

    /// Default user.
    pub user: String,

    /// Default password.
    pub pass: String,

    /// Reject requests whose ns/db/user/pass differ from a configured,
    /// non-empty value. When off, configured values only fill blanks.
    pub enforce_credentials: bool,

    /// Timeout for the signin call in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Host with the port appended when one is configured.
    pub fn authority(&self) -> String {
        if self.port.is_empty() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8000".to_string(),
            port: String::new(),
            protocol: "https".to_string(),
            ns: String::new(),
            db: String::new(),
            user: String::new(),
            pass: String::new(),
            enforce_credentials: true,
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("ns", &self.ns)
            .field("db", &self.db)
            .field("user", &self.user)
            .field("pass", &redact(&self.pass))
            .field("enforce_credentials", &self.enforce_credentials)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Secrets and request hardening.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret expected in `Authorization: Bearer <secret>`.
    pub bearer_secret: String,

    /// 32-byte key, raw or `base64:`-prefixed.
    pub encryption_key: String,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bearer_secret: String::new(),
            encryption_key: String::new(),
            max_body_size: 64 * 1024,
        }
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("bearer_secret", &redact(&self.bearer_secret))
            .field("encryption_key", &redact(&self.encryption_key))
            .field("max_body_size", &self.max_body_size)
            .finish()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "[REDACTED]"
    }
}
