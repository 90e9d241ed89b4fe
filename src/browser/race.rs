//! One-shot first-write-wins delivery point
//!
//! Each page load races three signal sources: a timer, the DOM-content
//! event listener, and the navigation call itself. Exactly one outcome is
//! delivered to the single reader; every later settle attempt must be a
//! silent no-op, since the losing tasks outlive the read.

use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Cloneable writer half of a [`RaceCell`].
#[derive(Clone)]
pub struct RaceSender<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> RaceSender<T> {
    /// Attempts to settle the race with `value`.
    ///
    /// Returns true for the winning write. Once the cell is settled (or the
    /// reader is gone) all further calls return false without blocking.
    pub fn settle(&self, value: T) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            // A poisoned slot means another writer panicked mid-settle;
            // treat the race as settled.
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }
}

/// One-shot cell resolving a race among concurrent writers.
pub struct RaceCell<T> {
    rx: oneshot::Receiver<T>,
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> RaceCell<T> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            rx,
            slot: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Returns a new writer handle for this cell.
    pub fn sender(&self) -> RaceSender<T> {
        RaceSender {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Waits for the winning write and consumes the cell.
    ///
    /// Panics only if every sender was dropped without settling, which the
    /// page-load race never does (the timer task always settles).
    pub async fn outcome(self) -> T {
        self.rx
            .await
            .expect("race cell dropped without a settling write")
    }
}

impl<T> Default for RaceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_write_wins() {
        let cell = RaceCell::new();
        let a = cell.sender();
        let b = cell.sender();
        assert!(a.settle(1));
        assert!(!b.settle(2));
        assert_eq!(cell.outcome().await, 1);
    }

    #[tokio::test]
    async fn test_late_writers_after_read_are_noops() {
        let cell = RaceCell::new();
        let winner = cell.sender();
        let late = cell.sender();
        assert!(winner.settle("won"));
        assert_eq!(cell.outcome().await, "won");
        // The reader is gone; a late writer must neither block nor panic.
        assert!(!late.settle("lost"));
    }

    #[tokio::test]
    async fn test_concurrent_writers_deliver_exactly_one() {
        let cell = RaceCell::<usize>::new();
        let mut tasks = Vec::new();
        for i in 0..8 {
            let sender = cell.sender();
            tasks.push(tokio::spawn(async move { sender.settle(i) }));
        }
        let value = cell.outcome().await;
        assert!(value < 8);
        let mut wins = 0;
        for task in tasks {
            if task.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_reader_blocks_until_settled() {
        let cell = RaceCell::new();
        let sender = cell.sender();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.settle(42);
        });
        assert_eq!(cell.outcome().await, 42);
    }
}
