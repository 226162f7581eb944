//! # Seating
//!
//! Coordinates seating restaurant reservations at physical tables: linking a
//! booked party to a free table, and freeing the table when the party
//! finishes.
//!
//! Every seat and release runs an ordered validation pipeline before any
//! write, then updates the table and the reservation as one unit. Requests
//! for the same table are serialized by a per-table actor; requests for the
//! same reservation are serialized by a reservation lock.
//!
//! ## Core Modules
//!
//! - [`table`]: Models, validation pipeline, table actors and coordinator
//! - [`db`]: Store trait with PostgreSQL and in-memory implementations
//!
//! ## Example
//!
//! ```
//! use seating::table::{Table, TableStatus};
//!
//! fn is_free(table: &Table) -> bool {
//!     table.status() == TableStatus::Free
//! }
//! ```

/// Table and reservation storage.
pub mod db;

/// Seating models, validation and coordination.
pub mod table;

pub use db::{InMemoryRepository, PgSeatingRepository, SeatingRepository};
pub use table::{
    ErrorKind, Reservation, ReservationId, ReservationStatus, SeatRequest, SeatingCoordinator,
    SeatingError, SeatingResult, Table, TableDraft, TableId, TableStatus,
};
