//! HTTP API for the seating server.
//!
//! # Modules
//!
//! - [`tables`]: Table management (list, create, seat, release)
//! - [`request_id`]: Request correlation, request logging and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                        - Store health status
//! GET    /tables                        - List tables
//! POST   /tables                        - Create table
//! PUT    /tables/{table_id}/seat        - Seat a reservation
//! DELETE /tables/{table_id}/seat        - Release the table
//! ```
//!
//! The table routes are also served under `/api/v1`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use seating::{db::InMemoryRepository, table::SeatingCoordinator};
//! use seating_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = SeatingCoordinator::new(Arc::new(InMemoryRepository::new()));
//! let app = create_router(AppState {
//!     coordinator: Arc::new(coordinator),
//! });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively so the front-end dev server can call
//! the API from another origin.

pub mod request_id;
pub mod tables;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
};
use seating::table::SeatingCoordinator;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the coordinator sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SeatingCoordinator>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with the seating coordinator
///
/// # Returns
///
/// Configured Axum router ready to serve requests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(table_routes())
        .nest("/api/v1", table_routes())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(tables::list_tables).post(tables::create_table))
        .route(
            "/tables/{table_id}/seat",
            put(tables::seat_table).delete(tables::release_table),
        )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, or `503 Service Unavailable`
/// otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5001/health
/// # {"status":"healthy","version":"0.1.0","database":true,"tables":{"active_actors":2},"timestamp":"2026-10-18T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.coordinator.repository().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
    };

    let active_actors = state.coordinator.active_table_count().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "tables": {
            "active_actors": active_actors
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
