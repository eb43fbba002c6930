//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): signin requests by outcome
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_admission_denied_total` (counter): denials by reason
//! - `gateway_auth_failures_total` (counter): bearer failures by reason
//! - `gateway_upstream_errors_total` (counter): upstream failures by kind
//! - `gateway_tracked_clients` (gauge): records in the admission table
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - Labels are static strings, never client input

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("gateway_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_admission_denied(reason: &'static str) {
    metrics::counter!("gateway_admission_denied_total", "reason" => reason).increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!("gateway_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_tracked_clients(count: usize) {
    metrics::gauge!("gateway_tracked_clients").set(count as f64);
}
