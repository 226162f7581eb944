//! Structured logging configuration.
//!
//! Installs a `tracing` subscriber for the server. Records emitted through
//! the `log` facade by the `seating` library are forwarded to the same
//! subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Features:
/// - Request ID correlation (see `api::request_id`)
/// - Configurable log levels via RUST_LOG env var
/// - `log` records from the seating library
///
/// # Example
///
/// ```no_run
/// use seating_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log performance metric
///
/// # Arguments
///
/// * `operation` - Operation name
/// * `duration_ms` - Duration in milliseconds
/// * `metadata` - Additional metadata
///
/// # Example
///
/// ```
/// use seating_server::logging::log_performance;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// // ... do work ...
/// let duration = start.elapsed().as_millis() as u64;
/// log_performance("seat", duration, Some("table 4"));
/// ```
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_performance() {
        log_performance("seat", 500, Some("table 1"));
        log_performance("release", 2000, None);
    }
}
