//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order from a validated config
//! - Start background tasks (admission sweeper, metrics)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::schema::TlsConfig;
use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::Gateway;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::security::AdmissionLimiter;
use crate::upstream::{HttpSigninClient, UpstreamError};

/// Errors that stop the gateway from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Upstream client: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Wire the limiter, upstream client and cipher key into a gateway.
pub fn build_gateway(config: &GatewayConfig) -> Result<(Arc<Gateway>, Arc<AdmissionLimiter>), StartupError> {
    let limiter = Arc::new(AdmissionLimiter::new(config.admission.clone()));
    let upstream = Arc::new(HttpSigninClient::new(&config.upstream)?);
    let gateway = Gateway::from_config(config, limiter.clone(), upstream)?;
    Ok((Arc::new(gateway), limiter))
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, StartupError> {
    for path in [&tls.cert_path, &tls.key_path] {
        if !Path::new(path).exists() {
            return Err(StartupError::Tls(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )));
        }
    }
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(StartupError::Tls)
}

/// Run the gateway until `shutdown` is triggered.
pub async fn run(config: GatewayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let (gateway, limiter) = build_gateway(&config)?;
    let sweeper = limiter.spawn_sweeper(shutdown.clone());

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config, gateway);

    let served = match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            let addr: SocketAddr = address.parse().map_err(|e| StartupError::Bind {
                address: address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;
            server.run_tls(addr, rustls, shutdown.clone()).await
        }
        None => {
            let listener = TcpListener::bind(&address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: address.clone(),
                    source,
                })?;
            server.run(listener, shutdown.clone()).await
        }
    };

    shutdown.trigger();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Admission sweeper task failed");
    }
    served.map_err(StartupError::Serve)
}
