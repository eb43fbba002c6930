//! Credential gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │               CREDENTIAL GATEWAY              │
//!                        │                                               │
//!   POST /signin         │  ┌──────────┐   ┌───────────┐   ┌──────────┐  │
//!   ─────────────────────┼─▶│   http   │──▶│ admission │──▶│  bearer  │  │
//!                        │  │  server  │   │  limiter  │   │  check   │  │
//!                        │  └──────────┘   └───────────┘   └────┬─────┘  │
//!                        │                                      │        │
//!                        │                                      ▼        │
//!                        │  ┌──────────┐   ┌───────────┐   ┌──────────┐  │
//!   JSON response        │  │ response │◀──│  cipher   │◀──│ upstream │◀─┼── Database
//!   ◀────────────────────┼──│ mapping  │   │  engine   │   │  signin  │  │   /signin
//!                        │  └──────────┘   └───────────┘   └──────────┘  │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use credential_gateway::config::load_config;
use credential_gateway::lifecycle::{self, signals, Shutdown};
use credential_gateway::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::var_os("GATEWAY_CONFIG").map(PathBuf::from);

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_tracing("info");
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("credential-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        upstream_host = %config.upstream.host,
        max_requests_per_minute = config.admission.max_requests_per_minute,
        max_failed_attempts = config.admission.max_failed_attempts,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match lifecycle::run(config, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway stopped with error");
            ExitCode::FAILURE
        }
    }
}
