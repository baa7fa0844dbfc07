use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Guard over one cell's critical section. Dropping it releases the cell
/// on every exit path, including early returns and errors.
pub type CellGuard = OwnedMutexGuard<()>;

/// Per-cell mutual exclusion for spreadsheet mutations. Entries are
/// created lazily and never removed; the key space is bounded by the 56
/// grid cells, so the map only ever grows to that size.
pub struct CellLocks {
    acquire_timeout: Duration,
    cells: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CellLocks {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            acquire_timeout,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for `cell` with a bounded wait. `None` means the
    /// wait timed out and the operation should fail as "busy" rather than
    /// block indefinitely.
    pub async fn acquire(&self, cell: &str) -> Option<CellGuard> {
        let lock = {
            let mut cells = self.cells.lock().await;
            cells
                .entry(cell.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        match tokio::time::timeout(self.acquire_timeout, lock.lock_owned()).await {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!(
                    "lock acquisition for cell {cell} timed out after {:?}",
                    self.acquire_timeout
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_free_cell() {
        let locks = CellLocks::new(Duration::from_millis(50));
        let guard = locks.acquire("B2").await;
        assert!(guard.is_some());
    }

    #[tokio::test]
    async fn test_acquire_times_out_on_held_cell() {
        let locks = CellLocks::new(Duration::from_millis(20));
        let held = locks.acquire("B2").await.unwrap();

        let second = locks.acquire("B2").await;
        assert!(second.is_none());

        drop(held);
        assert!(locks.acquire("B2").await.is_some());
    }

    #[tokio::test]
    async fn test_different_cells_do_not_contend() {
        let locks = CellLocks::new(Duration::from_millis(20));
        let _b2 = locks.acquire("B2").await.unwrap();
        assert!(locks.acquire("D3").await.is_some());
    }

    #[tokio::test]
    async fn test_drop_releases_even_inside_error_path() {
        let locks = Arc::new(CellLocks::new(Duration::from_millis(50)));

        async fn failing_op(locks: &CellLocks) -> Result<(), &'static str> {
            let _guard = locks.acquire("F4").await.ok_or("busy")?;
            Err("write failed")
        }

        assert!(failing_op(&locks).await.is_err());
        // The guard dropped with the error, so the cell is free again.
        assert!(locks.acquire("F4").await.is_some());
    }
}
