//! HTTP server for restaurant table seating.
//!
//! Wraps the `seating` library's coordinator in an axum router, with
//! environment-driven configuration, structured logging and optional
//! Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
