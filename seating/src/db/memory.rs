//! In-memory `SeatingRepository` for tests and database-less runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::repository::SeatingRepository;
use crate::table::{
    errors::{SeatingError, SeatingResult},
    models::{
        NewReservation, NewTable, Reservation, ReservationId, ReservationStatus, Table, TableId,
    },
};

#[derive(Default)]
struct MemoryState {
    tables: BTreeMap<TableId, Table>,
    reservations: HashMap<ReservationId, Reservation>,
    next_table_id: TableId,
    next_reservation_id: ReservationId,
}

/// Table and reservation store held in process memory.
///
/// Uses the trait's default compensating `seat`/`unseat`.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a reservation. Reservations normally come from the booking
    /// side; this exists for tests and demo data.
    pub async fn insert_reservation(&self, reservation: NewReservation) -> Reservation {
        let mut state = self.state.write().await;
        state.next_reservation_id += 1;
        let now = Utc::now();

        let reservation = Reservation {
            reservation_id: state.next_reservation_id,
            first_name: reservation.first_name,
            last_name: reservation.last_name,
            mobile_number: reservation.mobile_number,
            reservation_date: reservation.reservation_date,
            reservation_time: reservation.reservation_time,
            people: reservation.people,
            status: ReservationStatus::Booked,
            created_at: now,
            updated_at: now,
        };

        state
            .reservations
            .insert(reservation.reservation_id, reservation.clone());
        reservation
    }

    /// Delete a reservation record outright, leaving any table link dangling
    pub async fn remove_reservation(&self, reservation_id: ReservationId) -> Option<Reservation> {
        self.state.write().await.reservations.remove(&reservation_id)
    }
}

#[async_trait]
impl SeatingRepository for InMemoryRepository {
    async fn find_table(&self, table_id: TableId) -> SeatingResult<Option<Table>> {
        Ok(self.state.read().await.tables.get(&table_id).cloned())
    }

    async fn find_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> SeatingResult<Option<Reservation>> {
        Ok(self
            .state
            .read()
            .await
            .reservations
            .get(&reservation_id)
            .cloned())
    }

    async fn insert_table(&self, table: &NewTable) -> SeatingResult<Table> {
        let mut state = self.state.write().await;
        state.next_table_id += 1;
        let now = Utc::now();

        let table = Table {
            table_id: state.next_table_id,
            table_name: table.table_name.clone(),
            capacity: table.capacity,
            reservation_id: None,
            created_at: now,
            updated_at: now,
        };

        state.tables.insert(table.table_id, table.clone());
        Ok(table)
    }

    async fn list_tables(&self) -> SeatingResult<Vec<Table>> {
        let state = self.state.read().await;
        let mut tables: Vec<Table> = state.tables.values().cloned().collect();
        tables.sort_by(|a, b| {
            a.table_name
                .cmp(&b.table_name)
                .then(a.table_id.cmp(&b.table_id))
        });
        Ok(tables)
    }

    async fn update_table_assignment(
        &self,
        table_id: TableId,
        reservation_id: Option<ReservationId>,
    ) -> SeatingResult<Table> {
        let mut state = self.state.write().await;
        let table = state
            .tables
            .get_mut(&table_id)
            .ok_or(SeatingError::TableNotFound(table_id))?;

        table.reservation_id = reservation_id;
        table.updated_at = Utc::now();
        Ok(table.clone())
    }

    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> SeatingResult<Reservation> {
        let mut state = self.state.write().await;
        let reservation = state
            .reservations
            .get_mut(&reservation_id)
            .ok_or(SeatingError::ReservationNotFound(reservation_id))?;

        reservation.status = status;
        reservation.updated_at = Utc::now();
        Ok(reservation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(people: i32) -> NewReservation {
        NewReservation {
            first_name: "Frank".to_string(),
            last_name: "Palmer".to_string(),
            mobile_number: "202-555-0153".to_string(),
            reservation_date: "2026-12-31".to_string(),
            reservation_time: "14:00".to_string(),
            people,
        }
    }

    fn new_table(name: &str, capacity: i32) -> NewTable {
        NewTable {
            table_name: name.to_string(),
            capacity,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_table(&new_table("#1", 2)).await.unwrap();
        let second = repo.insert_table(&new_table("#2", 4)).await.unwrap();
        assert_eq!(first.table_id, 1);
        assert_eq!(second.table_id, 2);
        assert!(second.reservation_id.is_none());

        let reservation = repo.insert_reservation(party(3)).await;
        assert_eq!(reservation.reservation_id, 1);
        assert_eq!(reservation.status, ReservationStatus::Booked);
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let repo = InMemoryRepository::new();
        repo.insert_table(&new_table("Patio", 6)).await.unwrap();
        repo.insert_table(&new_table("Bar #1", 1)).await.unwrap();
        repo.insert_table(&new_table("Bar #2", 1)).await.unwrap();

        let names: Vec<String> = repo
            .list_tables()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.table_name)
            .collect();
        assert_eq!(names, vec!["Bar #1", "Bar #2", "Patio"]);
    }

    #[tokio::test]
    async fn test_updates_report_missing_records() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.update_table_assignment(5, Some(1)).await,
            Err(SeatingError::TableNotFound(5))
        ));
        assert!(matches!(
            repo.update_reservation_status(8, ReservationStatus::Seated)
                .await,
            Err(SeatingError::ReservationNotFound(8))
        ));
    }

    #[tokio::test]
    async fn test_default_seat_and_unseat() {
        let repo = InMemoryRepository::new();
        let table = repo.insert_table(&new_table("#1", 4)).await.unwrap();
        let reservation = repo.insert_reservation(party(4)).await;

        let seated = repo
            .seat(table.table_id, reservation.reservation_id)
            .await
            .unwrap();
        assert_eq!(seated.reservation_id, Some(reservation.reservation_id));

        let freed = repo
            .unseat(table.table_id, reservation.reservation_id)
            .await
            .unwrap();
        assert!(freed.reservation_id.is_none());

        let finished = repo
            .find_reservation(reservation.reservation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(finished.status, ReservationStatus::Finished);
    }

    #[tokio::test]
    async fn test_unseat_tolerates_dangling_reservation() {
        let repo = InMemoryRepository::new();
        let table = repo.insert_table(&new_table("#1", 4)).await.unwrap();
        let reservation = repo.insert_reservation(party(2)).await;
        repo.seat(table.table_id, reservation.reservation_id)
            .await
            .unwrap();

        repo.remove_reservation(reservation.reservation_id).await;

        let freed = repo
            .unseat(table.table_id, reservation.reservation_id)
            .await
            .unwrap();
        assert!(!freed.is_occupied());
    }
}
