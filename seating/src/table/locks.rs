//! Per-reservation async locks.
//!
//! Table actors already serialize work on one table. A reservation can be
//! targeted from several tables at once, so its id is locked separately.
//! Callers always hold the table first and the reservation second.

use super::models::ReservationId;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<ReservationId, Arc<tokio::sync::Mutex<()>>>;

/// Registry of reservation locks, created on demand
#[derive(Clone, Default)]
pub struct ReservationLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl ReservationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `reservation_id`.
    pub async fn lock(&self, reservation_id: ReservationId) -> ReservationGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(reservation_id).or_default().clone()
        };

        let guard = lock.lock_owned().await;

        ReservationGuard {
            reservation_id,
            locks: self.clone(),
            _guard: guard,
        }
    }

    /// Number of reservation ids currently locked or awaited
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held while a reservation is being read and written
pub struct ReservationGuard {
    reservation_id: ReservationId,
    locks: ReservationLocks,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Two owners left means the map and this guard: nobody is waiting.
        if let Some(entry) = map.get(&self.reservation_id)
            && Arc::strong_count(entry) <= 2
        {
            map.remove(&self.reservation_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entries_removed_when_released() {
        let locks = ReservationLocks::new();
        {
            let _guard = locks.lock(10).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let locks = ReservationLocks::new();
        let guard = locks.lock(10).await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.lock(10).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = ReservationLocks::new();
        let _first = locks.lock(10).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock(11)).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
