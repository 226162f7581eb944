//! Prometheus metrics for seating operations.
//!
//! The `metrics` macros are no-ops until a recorder is installed, so
//! handlers record unconditionally and the exporter is only started when
//! requested.
//!
//! # Example
//!
//! ```no_run
//! use seating_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("PUT", "/tables/{table_id}/seat", 200);
//! metrics::seating_assignment("seated");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Seating Metrics
// ============================================================================

/// Count a seat attempt by outcome (`seated`, `not_found`, `rejected`, `error`).
pub fn seating_assignment(outcome: &'static str) {
    metrics::counter!("seating_assignments_total", "outcome" => outcome).increment(1);
}

/// Count a release attempt by outcome.
pub fn seating_release(outcome: &'static str) {
    metrics::counter!("seating_releases_total", "outcome" => outcome).increment(1);
}

/// Increment tables created counter.
pub fn tables_created_total() {
    metrics::counter!("tables_created_total").increment(1);
}

/// Set current running table actors count.
pub fn active_table_actors(count: usize) {
    metrics::gauge!("active_table_actors").set(count as f64);
}
