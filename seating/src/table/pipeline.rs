//! Validation pipeline gating every seat and release request.
//!
//! Each check is a plain function over already-loaded records that either
//! passes or returns the failure the caller sees. [`run`] applies a list of
//! checks in order and stops at the first failure. Lookups come first, so a
//! missing record is always reported before any business rule.

use super::{
    errors::{
        INSUFFICIENT_CAPACITY, MISSING_RESERVATION_ID, RESERVATION_SEATED, SeatingError,
        SeatingResult, TABLE_NOT_OCCUPIED, TABLE_OCCUPIED,
    },
    models::{Reservation, ReservationId, ReservationStatus, SeatRequest, Table, TableId},
};
use crate::db::SeatingRepository;

/// A single gate over a loaded subject
pub type Check<T> = fn(&T) -> SeatingResult<()>;

/// Table and reservation loaded for a seat request
#[derive(Debug, Clone)]
pub struct Assignment {
    pub table: Table,
    pub reservation: Reservation,
}

/// Business rules for seating, in evaluation order
pub const ASSIGN_RULES: [Check<Assignment>; 3] =
    [check_capacity, check_table_free, check_not_seated];

/// Business rules for releasing a table
pub const RELEASE_RULES: [Check<Table>; 1] = [check_occupied];

/// Run `checks` against `subject`, returning the first failure.
pub fn run<T>(subject: &T, checks: &[Check<T>]) -> SeatingResult<()> {
    checks.iter().try_for_each(|check| check(subject))
}

/// Well-formed input check, done before any lookup.
pub fn require_reservation_id(request: &SeatRequest) -> SeatingResult<ReservationId> {
    request
        .reservation_id
        .ok_or_else(|| SeatingError::MissingField(MISSING_RESERVATION_ID.to_string()))
}

pub async fn resolve_table(
    repository: &dyn SeatingRepository,
    table_id: TableId,
) -> SeatingResult<Table> {
    repository
        .find_table(table_id)
        .await?
        .ok_or(SeatingError::TableNotFound(table_id))
}

pub async fn resolve_reservation(
    repository: &dyn SeatingRepository,
    reservation_id: ReservationId,
) -> SeatingResult<Reservation> {
    repository
        .find_reservation(reservation_id)
        .await?
        .ok_or(SeatingError::ReservationNotFound(reservation_id))
}

pub fn check_capacity(assignment: &Assignment) -> SeatingResult<()> {
    if assignment.table.capacity >= assignment.reservation.people {
        Ok(())
    } else {
        Err(SeatingError::invalid(INSUFFICIENT_CAPACITY))
    }
}

pub fn check_table_free(assignment: &Assignment) -> SeatingResult<()> {
    if assignment.table.is_occupied() {
        Err(SeatingError::invalid(TABLE_OCCUPIED))
    } else {
        Ok(())
    }
}

pub fn check_not_seated(assignment: &Assignment) -> SeatingResult<()> {
    if assignment.reservation.status == ReservationStatus::Seated {
        Err(SeatingError::invalid(RESERVATION_SEATED))
    } else {
        Ok(())
    }
}

pub fn check_occupied(table: &Table) -> SeatingResult<()> {
    if table.is_occupied() {
        Ok(())
    } else {
        Err(SeatingError::invalid(TABLE_NOT_OCCUPIED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn table(capacity: i32, reservation_id: Option<ReservationId>) -> Table {
        Table {
            table_id: 1,
            table_name: "#1".to_string(),
            capacity,
            reservation_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reservation(people: i32, status: ReservationStatus) -> Reservation {
        Reservation {
            reservation_id: 10,
            first_name: "Rick".to_string(),
            last_name: "Sanchez".to_string(),
            mobile_number: "202-555-0164".to_string(),
            reservation_date: "2026-12-30".to_string(),
            reservation_time: "20:00".to_string(),
            people,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(
        capacity: i32,
        occupied_by: Option<ReservationId>,
        people: i32,
        status: ReservationStatus,
    ) -> Assignment {
        Assignment {
            table: table(capacity, occupied_by),
            reservation: reservation(people, status),
        }
    }

    fn message(result: SeatingResult<()>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_missing_reservation_id() {
        let err = require_reservation_id(&SeatRequest::default()).unwrap_err();
        assert!(matches!(err, SeatingError::MissingField(_)));
        assert_eq!(err.to_string(), MISSING_RESERVATION_ID);

        let id = require_reservation_id(&SeatRequest {
            reservation_id: Some(3),
        })
        .unwrap();
        assert_eq!(id, 3);
    }

    #[test]
    fn test_assign_rules_pass_for_free_table_and_booked_party() {
        let subject = assignment(4, None, 4, ReservationStatus::Booked);
        assert!(run(&subject, &ASSIGN_RULES).is_ok());
    }

    #[test]
    fn test_capacity_is_checked_first() {
        // Every rule fails here; capacity must win.
        let subject = assignment(2, Some(99), 5, ReservationStatus::Seated);
        assert_eq!(message(run(&subject, &ASSIGN_RULES)), INSUFFICIENT_CAPACITY);
    }

    #[test]
    fn test_occupancy_checked_before_seated_status() {
        let subject = assignment(8, Some(99), 2, ReservationStatus::Seated);
        assert_eq!(message(run(&subject, &ASSIGN_RULES)), TABLE_OCCUPIED);
    }

    #[test]
    fn test_already_seated_reservation_rejected() {
        let subject = assignment(8, None, 2, ReservationStatus::Seated);
        assert_eq!(message(run(&subject, &ASSIGN_RULES)), RESERVATION_SEATED);
    }

    #[test]
    fn test_finished_reservation_is_not_blocked_by_seated_check() {
        let subject = assignment(8, None, 2, ReservationStatus::Finished);
        assert!(check_not_seated(&subject).is_ok());
    }

    #[test]
    fn test_release_rules() {
        assert!(run(&table(4, Some(12)), &RELEASE_RULES).is_ok());
        assert_eq!(
            message(run(&table(4, None), &RELEASE_RULES)),
            TABLE_NOT_OCCUPIED
        );
    }

    #[test]
    fn test_run_with_no_checks_passes() {
        let checks: [Check<Table>; 0] = [];
        assert!(run(&table(1, None), &checks).is_ok());
    }
}
