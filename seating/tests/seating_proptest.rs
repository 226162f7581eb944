/// Property-based tests for seat and release using proptest
///
/// These tests drive the coordinator with random capacities, party sizes
/// and operation sequences and check that the table and reservation
/// records always agree.
use proptest::prelude::*;
use seating::db::{InMemoryRepository, SeatingRepository};
use seating::table::{
    NewReservation, NewTable, ReservationId, ReservationStatus, SeatingCoordinator, TableDraft,
};
use serde_json::json;
use std::sync::Arc;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn new_reservation(people: i32) -> NewReservation {
    NewReservation {
        first_name: "Prop".to_string(),
        last_name: "Test".to_string(),
        mobile_number: "555-0199".to_string(),
        reservation_date: "2026-11-01".to_string(),
        reservation_time: "12:00".to_string(),
        people,
    }
}

#[derive(Debug, Clone)]
enum Op {
    Seat(usize),
    Release,
}

fn op_strategy(parties: usize) -> impl Strategy<Value = Op> {
    prop_oneof![(0..parties).prop_map(Op::Seat), Just(Op::Release)]
}

proptest! {
    #[test]
    fn test_seat_succeeds_iff_party_fits(capacity in 1i32..20, people in 1i32..25) {
        let (seated, occupied, status) = block_on(async {
            let repo = Arc::new(InMemoryRepository::new());
            let coordinator = SeatingCoordinator::new(repo.clone());
            let table = repo
                .insert_table(&NewTable { table_name: "P1".to_string(), capacity })
                .await
                .unwrap();
            let reservation = repo.insert_reservation(new_reservation(people)).await;

            let seated = coordinator
                .assign_reservation(table.table_id, reservation.reservation_id)
                .await
                .is_ok();
            let occupied = repo.find_table(table.table_id).await.unwrap().unwrap().is_occupied();
            let status = repo
                .find_reservation(reservation.reservation_id)
                .await
                .unwrap()
                .unwrap()
                .status;
            (seated, occupied, status)
        });

        prop_assert_eq!(seated, people <= capacity);
        prop_assert_eq!(occupied, seated);
        prop_assert_eq!(status == ReservationStatus::Seated, seated);
    }

    #[test]
    fn test_capacity_validation_accepts_only_positive_integers(capacity in -50i64..50) {
        let draft = TableDraft {
            table_name: Some("Booth".into()),
            capacity: Some(json!(capacity)),
        };
        prop_assert_eq!(draft.validate().is_ok(), capacity > 0);
    }

    #[test]
    fn test_table_and_reservations_stay_consistent(
        ops in prop::collection::vec(op_strategy(4), 1..30)
    ) {
        block_on(async {
            let repo = Arc::new(InMemoryRepository::new());
            let coordinator = SeatingCoordinator::new(repo.clone());
            let table = repo
                .insert_table(&NewTable { table_name: "P1".to_string(), capacity: 4 })
                .await
                .unwrap();

            let mut reservations: Vec<ReservationId> = Vec::new();
            for people in 1..=4 {
                reservations.push(repo.insert_reservation(new_reservation(people)).await.reservation_id);
            }

            for op in ops {
                let before = repo.find_table(table.table_id).await.unwrap().unwrap();
                match op {
                    Op::Seat(i) => {
                        let result = coordinator
                            .assign_reservation(table.table_id, reservations[i])
                            .await;
                        // Every party fits, and nobody is seated while the table is free.
                        assert_eq!(result.is_ok(), !before.is_occupied());
                    }
                    Op::Release => {
                        let result = coordinator.release(table.table_id).await;
                        assert_eq!(result.is_ok(), before.is_occupied());
                    }
                }

                // At most one reservation is seated, and it is the one the table points at.
                let after = repo.find_table(table.table_id).await.unwrap().unwrap();
                let mut seated = Vec::new();
                for id in &reservations {
                    let r = repo.find_reservation(*id).await.unwrap().unwrap();
                    if r.status == ReservationStatus::Seated {
                        seated.push(*id);
                    }
                }
                match after.reservation_id {
                    Some(id) => assert_eq!(seated, vec![id]),
                    None => assert!(seated.is_empty()),
                }
            }
        });
    }
}
