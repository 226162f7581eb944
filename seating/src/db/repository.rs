//! Repository trait definitions for testability and dependency injection.
//!
//! The seating coordinator only talks to storage through
//! [`SeatingRepository`], so the PostgreSQL store and the in-memory store
//! are interchangeable.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::table::{
    errors::{
        RESERVATION_SEATED, SeatingError, SeatingResult, TABLE_NOT_OCCUPIED, TABLE_OCCUPIED,
    },
    models::{NewTable, Reservation, ReservationId, ReservationStatus, Table, TableId},
};

/// Trait for table and reservation storage
#[async_trait]
pub trait SeatingRepository: Send + Sync {
    /// Find table by ID
    async fn find_table(&self, table_id: TableId) -> SeatingResult<Option<Table>>;

    /// Find reservation by ID
    async fn find_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> SeatingResult<Option<Reservation>>;

    /// Insert a new, unassigned table
    async fn insert_table(&self, table: &NewTable) -> SeatingResult<Table>;

    /// List all tables ordered by name
    async fn list_tables(&self) -> SeatingResult<Vec<Table>>;

    /// Link a table to a reservation, or clear the link with `None`
    ///
    /// # Errors
    ///
    /// * `SeatingError::TableNotFound` - No such table
    async fn update_table_assignment(
        &self,
        table_id: TableId,
        reservation_id: Option<ReservationId>,
    ) -> SeatingResult<Table>;

    /// Set a reservation's status
    ///
    /// # Errors
    ///
    /// * `SeatingError::ReservationNotFound` - No such reservation
    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> SeatingResult<Reservation>;

    /// Check that the store is reachable
    async fn health_check(&self) -> SeatingResult<()> {
        Ok(())
    }

    /// Seat a reservation at a table as a single unit.
    ///
    /// The default implementation writes the table first and undoes that
    /// write if the reservation update fails. Stores with real transactions
    /// override it.
    async fn seat(
        &self,
        table_id: TableId,
        reservation_id: ReservationId,
    ) -> SeatingResult<Table> {
        let table = self
            .update_table_assignment(table_id, Some(reservation_id))
            .await?;

        if let Err(e) = self
            .update_reservation_status(reservation_id, ReservationStatus::Seated)
            .await
        {
            match self.update_table_assignment(table_id, None).await {
                Ok(_) => {
                    log::info!(
                        "Rolled back table {} after failing to seat reservation {}",
                        table_id,
                        reservation_id
                    );
                }
                Err(rollback_err) => {
                    log::error!(
                        "CRITICAL: Failed to roll back table {} after failing to seat reservation {}: {}. Table points at an unseated reservation!",
                        table_id,
                        reservation_id,
                        rollback_err
                    );
                }
            }
            return Err(e);
        }

        Ok(table)
    }

    /// Finish the reservation seated at a table and free the table.
    ///
    /// A reservation id that no longer resolves does not block clearing the
    /// table. If clearing fails, a reservation already marked finished is put
    /// back to seated.
    async fn unseat(
        &self,
        table_id: TableId,
        reservation_id: ReservationId,
    ) -> SeatingResult<Table> {
        let finished = match self
            .update_reservation_status(reservation_id, ReservationStatus::Finished)
            .await
        {
            Ok(_) => true,
            Err(SeatingError::ReservationNotFound(_)) => {
                log::warn!(
                    "Table {} referenced missing reservation {}, clearing anyway",
                    table_id,
                    reservation_id
                );
                false
            }
            Err(e) => return Err(e),
        };

        match self.update_table_assignment(table_id, None).await {
            Ok(table) => Ok(table),
            Err(e) => {
                if finished
                    && let Err(rollback_err) = self
                        .update_reservation_status(reservation_id, ReservationStatus::Seated)
                        .await
                {
                    log::error!(
                        "CRITICAL: Failed to restore reservation {} after failing to clear table {}: {}",
                        reservation_id,
                        table_id,
                        rollback_err
                    );
                }
                Err(e)
            }
        }
    }
}

const TABLE_COLUMNS: &str = "table_id, table_name, capacity, reservation_id, created_at, updated_at";

const RESERVATION_COLUMNS: &str = "reservation_id, first_name, last_name, mobile_number,
    reservation_date, reservation_time, people, status, created_at, updated_at";

fn table_from_row(row: &PgRow) -> Table {
    Table {
        table_id: row.get("table_id"),
        table_name: row.get("table_name"),
        capacity: row.get("capacity"),
        reservation_id: row.get("reservation_id"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    }
}

fn reservation_from_row(row: &PgRow) -> SeatingResult<Reservation> {
    let status = row
        .get::<String, _>("status")
        .parse::<ReservationStatus>()
        .map_err(|e| SeatingError::Database(sqlx::Error::Decode(e.into())))?;

    Ok(Reservation {
        reservation_id: row.get("reservation_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        mobile_number: row.get("mobile_number"),
        reservation_date: row.get("reservation_date"),
        reservation_time: row.get("reservation_time"),
        people: row.get("people"),
        status,
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    })
}

/// The partial unique index on `tables.reservation_id` rejects a second
/// table for the same reservation
fn seated_elsewhere(e: sqlx::Error) -> SeatingError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            SeatingError::InvalidState(RESERVATION_SEATED.to_string())
        }
        _ => SeatingError::Database(e),
    }
}

/// Default PostgreSQL implementation of `SeatingRepository`
///
/// `seat` and `unseat` run inside one transaction each, with guarded
/// updates so a concurrent writer in another process cannot slip between
/// the read and the write.
#[derive(Clone)]
pub struct PgSeatingRepository {
    pool: PgPool,
}

impl PgSeatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Decide why a guarded table update matched no row
    async fn table_conflict(
        tx: &mut Transaction<'_, Postgres>,
        table_id: TableId,
    ) -> SeatingResult<SeatingError> {
        let exists = sqlx::query("SELECT 1 FROM tables WHERE table_id = $1")
            .bind(table_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match exists {
            Some(_) => SeatingError::InvalidState(TABLE_OCCUPIED.to_string()),
            None => SeatingError::TableNotFound(table_id),
        })
    }

    /// Decide why a guarded table release matched no row
    async fn release_conflict(
        tx: &mut Transaction<'_, Postgres>,
        table_id: TableId,
    ) -> SeatingResult<SeatingError> {
        Ok(match Self::table_conflict(tx, table_id).await? {
            SeatingError::InvalidState(_) => {
                SeatingError::InvalidState(TABLE_NOT_OCCUPIED.to_string())
            }
            other => other,
        })
    }

    /// Decide why a guarded reservation update matched no row
    async fn reservation_conflict(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: ReservationId,
    ) -> SeatingResult<SeatingError> {
        let exists = sqlx::query("SELECT 1 FROM reservations WHERE reservation_id = $1")
            .bind(reservation_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match exists {
            Some(_) => SeatingError::InvalidState(RESERVATION_SEATED.to_string()),
            None => SeatingError::ReservationNotFound(reservation_id),
        })
    }
}

#[async_trait]
impl SeatingRepository for PgSeatingRepository {
    async fn find_table(&self, table_id: TableId) -> SeatingResult<Option<Table>> {
        let row = sqlx::query(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables WHERE table_id = $1"
        ))
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(table_from_row))
    }

    async fn find_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> SeatingResult<Option<Reservation>> {
        let row = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(reservation_from_row).transpose()
    }

    async fn insert_table(&self, table: &NewTable) -> SeatingResult<Table> {
        let row = sqlx::query(&format!(
            "INSERT INTO tables (table_name, capacity) VALUES ($1, $2) RETURNING {TABLE_COLUMNS}"
        ))
        .bind(&table.table_name)
        .bind(table.capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(table_from_row(&row))
    }

    async fn list_tables(&self) -> SeatingResult<Vec<Table>> {
        let rows = sqlx::query(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables ORDER BY table_name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(table_from_row).collect())
    }

    async fn update_table_assignment(
        &self,
        table_id: TableId,
        reservation_id: Option<ReservationId>,
    ) -> SeatingResult<Table> {
        let row = sqlx::query(&format!(
            "UPDATE tables SET reservation_id = $1, updated_at = NOW()
             WHERE table_id = $2
             RETURNING {TABLE_COLUMNS}"
        ))
        .bind(reservation_id)
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(SeatingError::TableNotFound(table_id))?;

        Ok(table_from_row(&row))
    }

    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> SeatingResult<Reservation> {
        let row = sqlx::query(&format!(
            "UPDATE reservations SET status = $1, updated_at = NOW()
             WHERE reservation_id = $2
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(status.to_string())
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(SeatingError::ReservationNotFound(reservation_id))?;

        reservation_from_row(&row)
    }

    async fn health_check(&self) -> SeatingResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn seat(
        &self,
        table_id: TableId,
        reservation_id: ReservationId,
    ) -> SeatingResult<Table> {
        // Dropping `tx` on an early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let table_row = sqlx::query(&format!(
            "UPDATE tables SET reservation_id = $1, updated_at = NOW()
             WHERE table_id = $2 AND reservation_id IS NULL
             RETURNING {TABLE_COLUMNS}"
        ))
        .bind(reservation_id)
        .bind(table_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(seated_elsewhere)?;

        let table = match table_row {
            Some(row) => table_from_row(&row),
            None => return Err(Self::table_conflict(&mut tx, table_id).await?),
        };

        let seated = sqlx::query(
            "UPDATE reservations SET status = $1, updated_at = NOW()
             WHERE reservation_id = $2 AND status <> $1
             RETURNING reservation_id",
        )
        .bind(ReservationStatus::Seated.to_string())
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        if seated.is_none() {
            return Err(Self::reservation_conflict(&mut tx, reservation_id).await?);
        }

        tx.commit().await?;

        Ok(table)
    }

    async fn unseat(
        &self,
        table_id: TableId,
        reservation_id: ReservationId,
    ) -> SeatingResult<Table> {
        let mut tx = self.pool.begin().await?;

        let finished = sqlx::query(
            "UPDATE reservations SET status = $1, updated_at = NOW()
             WHERE reservation_id = $2
             RETURNING reservation_id",
        )
        .bind(ReservationStatus::Finished.to_string())
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        if finished.is_none() {
            log::warn!(
                "Table {} referenced missing reservation {}, clearing anyway",
                table_id,
                reservation_id
            );
        }

        let table_row = sqlx::query(&format!(
            "UPDATE tables SET reservation_id = NULL, updated_at = NOW()
             WHERE table_id = $1 AND reservation_id = $2
             RETURNING {TABLE_COLUMNS}"
        ))
        .bind(table_id)
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let table = match table_row {
            Some(row) => table_from_row(&row),
            None => return Err(Self::release_conflict(&mut tx, table_id).await?),
        };

        tx.commit().await?;

        Ok(table)
    }
}
