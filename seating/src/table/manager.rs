//! Seating coordinator routing requests to per-table actors.

use super::{
    actor::{TableActor, TableHandle},
    errors::SeatingResult,
    locks::ReservationLocks,
    models::{ReservationId, SeatRequest, Table, TableDraft, TableId},
    pipeline,
};
use crate::db::SeatingRepository;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Default bounded inbox size of each table actor
pub const DEFAULT_INBOX_CAPACITY: usize = 100;

/// Entry point for every table operation.
///
/// Seat and release requests are forwarded to an actor owning the target
/// table, spawned the first time that table is addressed. Creation and
/// listing go straight to the store.
pub struct SeatingCoordinator {
    /// Backing store
    repository: Arc<dyn SeatingRepository>,

    /// Running table actors
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,

    /// Locks shared by all actors
    reservation_locks: ReservationLocks,

    /// Inbox size for new actors
    inbox_capacity: usize,
}

impl SeatingCoordinator {
    /// Create a new coordinator
    ///
    /// # Arguments
    ///
    /// * `repository` - Table and reservation store
    ///
    /// # Returns
    ///
    /// * `SeatingCoordinator` - New coordinator with no running actors
    pub fn new(repository: Arc<dyn SeatingRepository>) -> Self {
        Self::with_inbox_capacity(repository, DEFAULT_INBOX_CAPACITY)
    }

    pub fn with_inbox_capacity(repository: Arc<dyn SeatingRepository>, inbox_capacity: usize) -> Self {
        Self {
            repository,
            tables: Arc::new(RwLock::new(HashMap::new())),
            reservation_locks: ReservationLocks::new(),
            inbox_capacity,
        }
    }

    /// Backing store
    pub fn repository(&self) -> &Arc<dyn SeatingRepository> {
        &self.repository
    }

    /// Validate and insert a new table
    ///
    /// # Errors
    ///
    /// * `SeatingError::InvalidState` - Bad `table_name` and/or `capacity`
    pub async fn create_table(&self, draft: &TableDraft) -> SeatingResult<Table> {
        let new_table = draft.validate()?;
        let table = self.repository.insert_table(&new_table).await?;

        log::info!(
            "Created table {} '{}' seating {}",
            table.table_id,
            table.table_name,
            table.capacity
        );

        Ok(table)
    }

    /// List all tables ordered by name
    pub async fn list_tables(&self) -> SeatingResult<Vec<Table>> {
        self.repository.list_tables().await
    }

    /// Seat the reservation named in `request` at a table
    ///
    /// Checks run in order: reservation id present, table exists,
    /// reservation exists, capacity, table free, reservation not seated.
    ///
    /// # Returns
    ///
    /// * `SeatingResult<Table>` - The table, now occupied
    pub async fn assign(&self, table_id: TableId, request: &SeatRequest) -> SeatingResult<Table> {
        let reservation_id = pipeline::require_reservation_id(request)?;
        self.assign_reservation(table_id, reservation_id).await
    }

    /// Seat a known reservation id at a table
    pub async fn assign_reservation(
        &self,
        table_id: TableId,
        reservation_id: ReservationId,
    ) -> SeatingResult<Table> {
        let handle = self.table_handle(table_id).await?;
        handle.seat(reservation_id).await
    }

    /// Finish the reservation seated at a table and free it
    pub async fn release(&self, table_id: TableId) -> SeatingResult<()> {
        let handle = self.table_handle(table_id).await?;
        handle.release().await
    }

    /// Number of running table actors
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    /// Stop every table actor
    pub async fn shutdown(&self) {
        let handles: Vec<TableHandle> = {
            let mut tables = self.tables.write().await;
            tables.drain().map(|(_, handle)| handle).collect()
        };

        for handle in handles {
            if let Err(e) = handle.close().await {
                log::debug!("Table {} already stopped: {}", handle.table_id(), e);
            }
        }

        log::info!("Seating coordinator shut down");
    }

    /// Get the actor for a table, spawning it if needed.
    ///
    /// Unknown tables fail with `TableNotFound` and never get an actor.
    async fn table_handle(&self, table_id: TableId) -> SeatingResult<TableHandle> {
        {
            let tables = self.tables.read().await;
            if let Some(handle) = tables.get(&table_id)
                && !handle.is_closed()
            {
                return Ok(handle.clone());
            }
        }

        pipeline::resolve_table(self.repository.as_ref(), table_id).await?;

        let mut tables = self.tables.write().await;

        // Another request may have spawned it while we were looking it up.
        if let Some(handle) = tables.get(&table_id)
            && !handle.is_closed()
        {
            return Ok(handle.clone());
        }

        let (actor, handle) = TableActor::new(
            table_id,
            self.repository.clone(),
            self.reservation_locks.clone(),
            self.inbox_capacity,
        );
        tables.insert(table_id, handle.clone());
        drop(tables);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::debug!("Spawned actor for table {}", table_id);

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::table::errors::{MISSING_RESERVATION_ID, SeatingError};

    #[tokio::test]
    async fn test_missing_reservation_id_checked_before_table_lookup() {
        let coordinator = SeatingCoordinator::new(Arc::new(InMemoryRepository::new()));

        // Table 42 does not exist, but the missing id must win.
        let err = coordinator
            .assign(42, &SeatRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_RESERVATION_ID);
    }

    #[tokio::test]
    async fn test_unknown_table_gets_no_actor() {
        let coordinator = SeatingCoordinator::new(Arc::new(InMemoryRepository::new()));

        let err = coordinator.release(42).await.unwrap_err();
        assert!(matches!(err, SeatingError::TableNotFound(42)));
        assert_eq!(coordinator.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_actor_reused_and_shut_down() {
        let repo = Arc::new(InMemoryRepository::new());
        let coordinator = SeatingCoordinator::new(repo);
        let table = coordinator
            .create_table(&TableDraft {
                table_name: Some("#1".into()),
                capacity: Some(serde_json::json!(2)),
            })
            .await
            .unwrap();

        for _ in 0..3 {
            let _ = coordinator.release(table.table_id).await;
        }
        assert_eq!(coordinator.active_table_count().await, 1);

        coordinator.shutdown().await;
        assert_eq!(coordinator.active_table_count().await, 0);
    }
}
