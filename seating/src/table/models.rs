//! Table and reservation data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{SeatingError, SeatingResult};

/// Table ID type
pub type TableId = i64;

/// Reservation ID type
pub type ReservationId = i64;

/// Minimum length of a table name
pub const MIN_TABLE_NAME_LEN: usize = 2;

/// Occupancy of a table.
///
/// Never stored: it is read off the table's reservation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Free,
    Occupied,
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStatus::Free => write!(f, "Free"),
            TableStatus::Occupied => write!(f, "Occupied"),
        }
    }
}

/// Physical table in the dining room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub table_id: TableId,
    pub table_name: String,
    pub capacity: i32,
    /// Reservation currently seated here, if any
    pub reservation_id: Option<ReservationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table {
    /// Current occupancy, derived from the reservation link
    pub fn status(&self) -> TableStatus {
        if self.reservation_id.is_some() {
            TableStatus::Occupied
        } else {
            TableStatus::Free
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status() == TableStatus::Occupied
    }
}

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Booked,
    Seated,
    Finished,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Booked => write!(f, "booked"),
            ReservationStatus::Seated => write!(f, "seated"),
            ReservationStatus::Finished => write!(f, "finished"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(ReservationStatus::Booked),
            "seated" => Ok(ReservationStatus::Seated),
            "finished" => Ok(ReservationStatus::Finished),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(format!("Unknown reservation status: {}", other)),
        }
    }
}

/// Reservation model
///
/// Contact and date/time fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub reservation_date: String,
    pub reservation_time: String,
    pub people: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reservation fields supplied by whoever books it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub reservation_date: String,
    pub reservation_time: String,
    pub people: i32,
}

/// Validated table ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTable {
    pub table_name: String,
    pub capacity: i32,
}

/// Raw create-table payload as received from a client.
///
/// Both fields stay untyped JSON values so a value of the wrong type is
/// rejected with the same message as a missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDraft {
    pub table_name: Option<serde_json::Value>,
    pub capacity: Option<serde_json::Value>,
}

impl TableDraft {
    /// Validate the payload, collecting every field error.
    ///
    /// # Errors
    ///
    /// * `SeatingError::InvalidState` - Joined messages of all failing fields
    pub fn validate(&self) -> SeatingResult<NewTable> {
        let mut errors = Vec::new();

        let table_name = match self.table_name.as_ref().and_then(serde_json::Value::as_str) {
            Some(name) if name.chars().count() >= MIN_TABLE_NAME_LEN => Some(name.to_string()),
            _ => {
                errors.push("Request body is missing a 'table_name' key.");
                None
            }
        };

        let capacity = match self.capacity.as_ref().and_then(serde_json::Value::as_i64) {
            Some(c) if c > 0 && c <= i64::from(i32::MAX) => Some(c as i32),
            _ => {
                errors.push("Request body is missing a 'capacity' key.");
                None
            }
        };

        match (table_name, capacity) {
            (Some(table_name), Some(capacity)) => Ok(NewTable {
                table_name,
                capacity,
            }),
            _ => Err(SeatingError::InvalidState(errors.join("; "))),
        }
    }
}

/// Raw assign payload as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatRequest {
    pub reservation_id: Option<ReservationId>,
}
