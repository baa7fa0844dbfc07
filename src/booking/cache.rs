use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::sheets::SheetsApi;

/// Full booking grid, including the header row and time-label column.
pub const FULL_RANGE: &str = "A1:N9";

/// Immutable full read of the grid. Replaced wholesale on refresh, never
/// mutated in place; handed out behind an `Arc` so readers keep whatever
/// version they started with.
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    pub rows: Vec<Vec<String>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl TableSnapshot {
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&str> {
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(col_idx))
            .map(String::as_str)
    }

    /// True when nothing was ever fetched or the remote returned no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct CacheState {
    snapshot: Option<Arc<TableSnapshot>>,
    fetched_at: Option<Instant>,
}

/// TTL cache over the full grid. At most one remote fetch is in flight at
/// a time; concurrent refreshers collapse into it via double-checked
/// locking on the refresh section.
pub struct TableCache {
    client: Arc<dyn SheetsApi>,
    sheet: String,
    ttl: Duration,
    state: RwLock<CacheState>,
    refresh: Mutex<()>,
}

impl TableCache {
    pub fn new(client: Arc<dyn SheetsApi>, sheet: &str, ttl: Duration) -> Self {
        Self {
            client,
            sheet: sheet.to_string(),
            ttl,
            state: RwLock::new(CacheState {
                snapshot: None,
                fetched_at: None,
            }),
            refresh: Mutex::new(()),
        }
    }

    /// Returns the cached snapshot when younger than the TTL and not
    /// forced; otherwise refetches. A failed fetch logs and degrades to
    /// the previous snapshot instead of failing the caller.
    pub async fn get(&self, force_refresh: bool) -> Arc<TableSnapshot> {
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot().await {
                return snapshot;
            }
        }

        let _refresh = self.refresh.lock().await;

        // Re-check under the refresh section: someone may have finished a
        // fetch while we were waiting for it.
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot().await {
                return snapshot;
            }
        }

        match self.client.get_data(&self.sheet, FULL_RANGE).await {
            Ok(rows) => {
                let snapshot = Arc::new(TableSnapshot {
                    rows,
                    fetched_at: Some(Utc::now()),
                });
                let mut state = self.state.write().await;
                state.snapshot = Some(snapshot.clone());
                state.fetched_at = Some(Instant::now());
                info!("table cache refreshed: {} rows", snapshot.rows.len());
                snapshot
            }
            Err(e) => {
                warn!("table refresh failed, serving stale snapshot: {e:#}");
                let state = self.state.read().await;
                state.snapshot.clone().unwrap_or_default()
            }
        }
    }

    /// Clears snapshot and timestamp so the next `get` refetches. Called
    /// after every successful write so the next table read reflects it.
    pub async fn invalidate(&self) {
        let _refresh = self.refresh.lock().await;
        let mut state = self.state.write().await;
        state.snapshot = None;
        state.fetched_at = None;
        debug!("table cache invalidated");
    }

    /// Age of the current snapshot, if any. Used by the health endpoint.
    pub async fn age(&self) -> Option<Duration> {
        let state = self.state.read().await;
        state.fetched_at.map(|at| at.elapsed())
    }

    /// Wall-clock time the current snapshot was fetched, if any.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        state.snapshot.as_ref().and_then(|s| s.fetched_at)
    }

    async fn fresh_snapshot(&self) -> Option<Arc<TableSnapshot>> {
        let state = self.state.read().await;
        let fetched_at = state.fetched_at?;
        if fetched_at.elapsed() < self.ttl {
            state.snapshot.clone()
        } else {
            None
        }
    }
}
