//! Table API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - Listing tables with their derived occupancy
//! - Creating tables
//! - Seating a reservation at a table
//! - Releasing a table when the party leaves
//!
//! Request and response bodies are wrapped in a `data` envelope.
//!
//! # Examples
//!
//! Seat a reservation:
//! ```bash
//! curl -X PUT http://localhost:5001/tables/1/seat \
//!   -H "Content-Type: application/json" \
//!   -d '{"data": {"reservation_id": 7}}'
//! ```

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use seating::table::{
    ErrorKind, ReservationId, SeatRequest, SeatingError, Table, TableDraft, TableId, TableStatus,
    errors::MISSING_DATA,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{AppState, request_id::RequestId};
use crate::metrics;

/// Request body envelope; `data` is optional so its absence gets a
/// readable message instead of a deserialization error
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Response body envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub table_id: TableId,
    pub table_name: String,
    pub capacity: i32,
    pub reservation_id: Option<ReservationId>,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Table> for TableResponse {
    fn from(table: Table) -> Self {
        Self {
            status: table.status(),
            table_id: table.table_id,
            table_name: table.table_name,
            capacity: table.capacity,
            reservation_id: table.reservation_id,
            created_at: table.created_at,
            updated_at: table.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a seating error to its HTTP status and client-safe message
fn seating_error(request_id: &RequestId, e: &SeatingError) -> ApiError {
    let status = match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => {
            tracing::error!(request_id = %request_id.as_str(), error = %e, "Seating operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.client_message())
}

fn outcome(e: &SeatingError) -> &'static str {
    match e.kind() {
        ErrorKind::NotFound => "not_found",
        ErrorKind::InvalidState => "rejected",
        ErrorKind::Internal => "error",
    }
}

/// Unwrap the `data` envelope of a JSON body
fn envelope_data<T>(payload: Result<Json<Envelope<T>>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(Envelope { data: Some(data) })) => Ok(data),
        Ok(Json(Envelope { data: None })) | Err(JsonRejection::MissingJsonContentType(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, MISSING_DATA))
        }
        Err(rejection) => Err(api_error(StatusCode::BAD_REQUEST, rejection.body_text())),
    }
}

/// Parse the `{table_id}` path segment; anything that is not an id names
/// a table that cannot exist
fn parse_table_id(raw: &str) -> Result<TableId, ApiError> {
    raw.parse().map_err(|_| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Table with id: {} not found.", raw),
        )
    })
}

/// List all tables ordered by name.
///
/// # Response
///
/// Returns `200 OK`:
/// ```json
/// {
///   "data": [
///     {
///       "table_id": 1,
///       "table_name": "Bar #1",
///       "capacity": 1,
///       "reservation_id": null,
///       "status": "Free",
///       "created_at": "2026-10-18T17:00:00Z",
///       "updated_at": "2026-10-18T17:00:00Z"
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `500 Internal Server Error`: Store failure
pub async fn list_tables(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<DataResponse<Vec<TableResponse>>>, ApiError> {
    let tables = state
        .coordinator
        .list_tables()
        .await
        .map_err(|e| seating_error(&request_id, &e))?;

    Ok(Json(DataResponse {
        data: tables.into_iter().map(TableResponse::from).collect(),
    }))
}

/// Create a table.
///
/// # Request Body
///
/// ```json
/// { "data": { "table_name": "Patio", "capacity": 6 } }
/// ```
///
/// # Response
///
/// Returns `201 Created` with the new, free table.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `data`, or bad `table_name`/`capacity`
pub async fn create_table(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<Envelope<TableDraft>>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<TableResponse>>), ApiError> {
    let draft = envelope_data(payload)?;

    let table = state
        .coordinator
        .create_table(&draft)
        .await
        .map_err(|e| seating_error(&request_id, &e))?;

    metrics::tables_created_total();

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: table.into(),
        }),
    ))
}

/// Seat a reservation at a table.
///
/// # Request Body
///
/// ```json
/// { "data": { "reservation_id": 7 } }
/// ```
///
/// # Response
///
/// Returns `200 OK` with the now occupied table.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `data` or `reservation_id`, capacity too
///   small, table occupied, reservation already seated
/// - `404 Not Found`: Table or reservation doesn't exist
pub async fn seat_table(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(raw_table_id): Path<String>,
    payload: Result<Json<Envelope<SeatRequest>>, JsonRejection>,
) -> Result<Json<DataResponse<TableResponse>>, ApiError> {
    let request = envelope_data(payload)?;
    let table_id = parse_table_id(&raw_table_id)?;

    let result = state.coordinator.assign(table_id, &request).await;
    metrics::active_table_actors(state.coordinator.active_table_count().await);

    match result {
        Ok(table) => {
            metrics::seating_assignment("seated");
            Ok(Json(DataResponse { data: table.into() }))
        }
        Err(e) => {
            metrics::seating_assignment(outcome(&e));
            tracing::debug!(
                request_id = %request_id.as_str(),
                table_id = table_id,
                "Seat rejected: {}",
                e
            );
            Err(seating_error(&request_id, &e))
        }
    }
}

/// Release a table, finishing the reservation seated there.
///
/// # Response
///
/// Returns `200 OK` with `{}`.
///
/// # Errors
///
/// - `400 Bad Request`: Table is not occupied
/// - `404 Not Found`: Table doesn't exist
pub async fn release_table(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(raw_table_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let table_id = parse_table_id(&raw_table_id)?;

    let result = state.coordinator.release(table_id).await;
    metrics::active_table_actors(state.coordinator.active_table_count().await);

    match result {
        Ok(()) => {
            metrics::seating_release("released");
            Ok(Json(json!({})))
        }
        Err(e) => {
            metrics::seating_release(outcome(&e));
            Err(seating_error(&request_id, &e))
        }
    }
}
