//! Seating error types.

use super::models::{ReservationId, TableId};
use thiserror::Error;

/// Message returned when an assign request carries no reservation id
pub const MISSING_RESERVATION_ID: &str = "Request is missing a 'reservation_id' key.";

/// Message returned when a request body has no `data` envelope
pub const MISSING_DATA: &str = "Body is missing a data property";

pub const INSUFFICIENT_CAPACITY: &str = "Table does not have sufficient capacity";
pub const TABLE_OCCUPIED: &str = "Table is already occupied";
pub const RESERVATION_SEATED: &str = "Reservation is already seated";
pub const TABLE_NOT_OCCUPIED: &str = "Table is not occupied.";

/// Failure classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced table or reservation does not exist
    NotFound,
    /// Input or business rule rejected the request
    InvalidState,
    /// Store or runtime failure
    Internal,
}

/// Seating errors
#[derive(Debug, Error)]
pub enum SeatingError {
    /// Required input field absent
    #[error("{0}")]
    MissingField(String),

    /// Table not found
    #[error("Table with id: {0} not found.")]
    TableNotFound(TableId),

    /// Reservation not found
    #[error("Reservation with id: {0} does not exist.")]
    ReservationNotFound(ReservationId),

    /// Business rule check failed
    #[error("{0}")]
    InvalidState(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Table actor is not accepting messages
    #[error("Seating unavailable: {0}")]
    Unavailable(String),
}

impl SeatingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeatingError::TableNotFound(_) | SeatingError::ReservationNotFound(_) => {
                ErrorKind::NotFound
            }
            SeatingError::MissingField(_) | SeatingError::InvalidState(_) => {
                ErrorKind::InvalidState
            }
            SeatingError::Database(_) | SeatingError::Unavailable(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message
    ///
    /// Store and runtime failures are reduced to a generic message so SQL
    /// details never reach a client.
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn invalid(message: &str) -> Self {
        SeatingError::InvalidState(message.to_string())
    }
}

/// Result type for seating operations
pub type SeatingResult<T> = Result<T, SeatingError>;
