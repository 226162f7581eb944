//! Table seating with one async actor per table.
//!
//! This module implements:
//! - Table and reservation models, with table occupancy derived from the
//!   reservation link
//! - The validation pipeline run before every seat and release
//! - TableActor: serializes all writes to a single table
//! - SeatingCoordinator: spawns actors on demand and routes requests
//! - Per-reservation locks so one party cannot be seated at two tables
//!
//! ## Example
//!
//! ```no_run
//! use seating::db::InMemoryRepository;
//! use seating::table::{SeatRequest, SeatingCoordinator, TableDraft};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = SeatingCoordinator::new(Arc::new(InMemoryRepository::new()));
//!
//!     let table = coordinator
//!         .create_table(&TableDraft {
//!             table_name: Some("Patio".into()),
//!             capacity: Some(serde_json::json!(6)),
//!         })
//!         .await?;
//!
//!     let request = SeatRequest { reservation_id: Some(1) };
//!     coordinator.assign(table.table_id, &request).await?;
//!     coordinator.release(table.table_id).await?;
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod errors;
pub mod locks;
pub mod manager;
pub mod messages;
pub mod models;
pub mod pipeline;

pub use actor::{TableActor, TableHandle};
pub use errors::{ErrorKind, SeatingError, SeatingResult};
pub use locks::ReservationLocks;
pub use manager::{DEFAULT_INBOX_CAPACITY, SeatingCoordinator};
pub use messages::TableMessage;
pub use models::{
    NewReservation, NewTable, Reservation, ReservationId, ReservationStatus, SeatRequest, Table,
    TableDraft, TableId, TableStatus,
};
