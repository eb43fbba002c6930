//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the signin and health handlers
//! - Wire up middleware (tracing, body limit, timeout, request ID)
//! - Bind server to a plain or TLS listener
//! - Hand each signin to the gateway orchestrator

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, GatewayError};
use crate::http::request::{self, UuidRequestId};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::upstream::SigninRequest;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server around `gateway`.
    pub fn new(config: GatewayConfig, gateway: Arc<Gateway>) -> Self {
        let state = AppState { gateway };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/signin", post(signin_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The configured router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        let grace = Duration::from_secs(self.config.timeouts.request_secs);
        let stop = shutdown.wait();
        tokio::spawn(async move {
            stop.await;
            drain.graceful_shutdown(Some(grace));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls).handle(handle).serve(app).await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// POST /signin
async fn signin_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request::request_id(&headers).to_string();
    let client_id = request::client_identity(&addr);

    tracing::debug!(request_id = %request_id, client = %client_id, "Signin request");

    let result = match state.gateway.authorize(&client_id, request::authorization(&headers)) {
        Ok(()) => match parse_body(&body) {
            Ok(signin) => state.gateway.exchange(&client_id, signin).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            metrics::record_request("success", start_time);
            response.into_response()
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, client = %client_id, error = %e, "Signin rejected");
            metrics::record_request(e.kind(), start_time);
            e.into_response()
        }
    }
}

/// An empty body means "use the configured defaults".
fn parse_body(body: &[u8]) -> Result<SigninRequest, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SigninRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
