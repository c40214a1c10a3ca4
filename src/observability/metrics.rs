//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpd_connections_total` (counter): finished connections by outcome
//! - `httpd_admission_rejections_total` (counter): 403/429 by reason
//! - `httpd_active_connections` (gauge): global slots in use
//! - `httpd_tracked_clients` (gauge): keys in the per-client table
//! - `httpd_connection_duration_seconds` (histogram): slot hold time
//!
//! # Design Decisions
//! - Uses the `metrics` facade; recording is a no-op until a recorder is installed
//! - Prometheus exporter is optional and bound to its own address

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished connection.
pub fn record_connection(outcome: &'static str, start: Instant) {
    counter!("httpd_connections_total", "outcome" => outcome).increment(1);
    histogram!("httpd_connection_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Count a policy rejection (`"per_client_limit"`, `"user_agent"`).
pub fn record_rejection(reason: &'static str) {
    counter!("httpd_admission_rejections_total", "reason" => reason).increment(1);
}

pub fn set_active_connections(active: usize) {
    gauge!("httpd_active_connections").set(active as f64);
}

pub fn set_tracked_clients(count: usize) {
    gauge!("httpd_tracked_clients").set(count as f64);
}
