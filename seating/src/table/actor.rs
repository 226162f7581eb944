//! Table actor implementation with async message handling.
//!
//! One actor owns all writes to one table. Requests for the same table are
//! queued in its inbox and handled one at a time, so the checks always see
//! what the previous request committed.

use super::{
    errors::{SeatingError, SeatingResult, TABLE_NOT_OCCUPIED},
    locks::ReservationLocks,
    messages::TableMessage,
    models::{ReservationId, Table, TableId},
    pipeline::{self, Assignment},
};
use crate::db::SeatingRepository;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Table actor handle for sending messages
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> SeatingResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SeatingError::Unavailable(format!("Table {} is closed", self.table_id)))
    }

    /// Seat a reservation and wait for the outcome
    pub async fn seat(&self, reservation_id: ReservationId) -> SeatingResult<Table> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::Seat {
            reservation_id,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| self.dropped())?
    }

    /// Release the table and wait for the outcome
    pub async fn release(&self) -> SeatingResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::Release { response: tx }).await?;
        rx.await.map_err(|_| self.dropped())?
    }

    /// Ask the actor to stop after the messages already queued
    pub async fn close(&self) -> SeatingResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::Close { response: tx }).await?;
        rx.await.map_err(|_| self.dropped())
    }

    fn dropped(&self) -> SeatingError {
        SeatingError::Unavailable(format!("Table {} dropped the request", self.table_id))
    }
}

/// Table actor serializing seat and release requests for one table
pub struct TableActor {
    /// Table ID
    id: TableId,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Backing store
    repository: Arc<dyn SeatingRepository>,

    /// Shared reservation locks
    reservation_locks: ReservationLocks,

    /// Is actor closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Table ID
    /// * `repository` - Backing store
    /// * `reservation_locks` - Locks shared by every actor of a coordinator
    /// * `inbox_capacity` - Bounded inbox size
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(
        id: TableId,
        repository: Arc<dyn SeatingRepository>,
        reservation_locks: ReservationLocks,
        inbox_capacity: usize,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(inbox_capacity.max(1));

        let actor = Self {
            id,
            inbox,
            repository,
            reservation_locks,
            is_closed: false,
        };

        (actor, TableHandle::new(sender, id))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::debug!("Table {} actor starting", self.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;

            if self.is_closed {
                break;
            }
        }

        log::debug!("Table {} actor stopped", self.id);
    }

    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Seat {
                reservation_id,
                response,
            } => {
                let result = self.handle_seat(reservation_id).await;
                let _ = response.send(result);
            }

            TableMessage::Release { response } => {
                let result = self.handle_release().await;
                let _ = response.send(result);
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Handle seat request
    async fn handle_seat(&self, reservation_id: ReservationId) -> SeatingResult<Table> {
        let repository = self.repository.as_ref();

        let table = pipeline::resolve_table(repository, self.id).await?;

        let _guard = self.reservation_locks.lock(reservation_id).await;
        let reservation = pipeline::resolve_reservation(repository, reservation_id).await?;

        let assignment = Assignment { table, reservation };
        pipeline::run(&assignment, &pipeline::ASSIGN_RULES)?;

        let table = repository.seat(self.id, reservation_id).await?;

        log::info!(
            "Seated reservation {} ({} people) at table {} '{}'",
            reservation_id,
            assignment.reservation.people,
            self.id,
            table.table_name
        );

        Ok(table)
    }

    /// Handle release request
    async fn handle_release(&self) -> SeatingResult<()> {
        let repository = self.repository.as_ref();

        let table = pipeline::resolve_table(repository, self.id).await?;
        pipeline::run(&table, &pipeline::RELEASE_RULES)?;

        let reservation_id = table
            .reservation_id
            .ok_or_else(|| SeatingError::invalid(TABLE_NOT_OCCUPIED))?;

        let _guard = self.reservation_locks.lock(reservation_id).await;
        repository.unseat(self.id, reservation_id).await?;

        log::info!(
            "Released table {} '{}', reservation {} finished",
            self.id,
            table.table_name,
            reservation_id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::table::models::{NewReservation, NewTable, ReservationStatus};

    async fn setup() -> (Arc<InMemoryRepository>, TableHandle, ReservationId) {
        let repo = Arc::new(InMemoryRepository::new());
        let table = repo
            .insert_table(&NewTable {
                table_name: "#1".to_string(),
                capacity: 4,
            })
            .await
            .unwrap();
        let reservation = repo
            .insert_reservation(NewReservation {
                first_name: "Tiger".to_string(),
                last_name: "Lion".to_string(),
                mobile_number: "808-555-0140".to_string(),
                reservation_date: "2026-12-30".to_string(),
                reservation_time: "18:00".to_string(),
                people: 4,
            })
            .await;

        let (actor, handle) =
            TableActor::new(table.table_id, repo.clone(), ReservationLocks::new(), 8);
        tokio::spawn(actor.run());

        (repo, handle, reservation.reservation_id)
    }

    #[tokio::test]
    async fn test_seat_then_release() {
        let (repo, handle, reservation_id) = setup().await;

        let table = handle.seat(reservation_id).await.unwrap();
        assert_eq!(table.reservation_id, Some(reservation_id));

        handle.release().await.unwrap();

        let reservation = repo.find_reservation(reservation_id).await.unwrap().unwrap();
        assert_eq!(reservation.status, ReservationStatus::Finished);
    }

    #[tokio::test]
    async fn test_close_stops_actor() {
        let (_repo, handle, reservation_id) = setup().await;

        handle.close().await.unwrap();
        let err = handle.seat(reservation_id).await.unwrap_err();
        assert!(matches!(err, SeatingError::Unavailable(_)));
    }
}
