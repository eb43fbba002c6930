//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid encryption key: {0}")]
    Key(#[from] crate::crypto::CipherError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` is the variable source; empty values are ignored so that an
/// exported-but-blank variable never clears a file setting.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }
    if let Some(secret) = get("JWT_SECRET") {
        config.security.bearer_secret = secret;
    }
    if let Some(key) = get("ENCRYPTION_KEY") {
        config.security.encryption_key = key;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    let upstream = &mut config.upstream;
    for (name, field) in [
        ("DB_HOST", &mut upstream.host),
        ("DB_PORT", &mut upstream.port),
        ("DB_PROTOCOL", &mut upstream.protocol),
        ("DB_NS", &mut upstream.ns),
        ("DB_NAME", &mut upstream.db),
        ("DB_USER", &mut upstream.user),
        ("DB_PASS", &mut upstream.pass),
    ] {
        if let Some(value) = get(name) {
            *field = value;
        }
    }

    config
}
