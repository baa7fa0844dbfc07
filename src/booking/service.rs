use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::booking::availability::{availability_for_date, booking_record, Availability};
use crate::booking::cache::{TableCache, TableSnapshot};
use crate::booking::locks::CellLocks;
use crate::booking::outcome::BookingError;
use crate::grid::{self, Day, TimeBand};
use crate::sheets::SheetsApi;
use crate::storage::UserStore;
use crate::utils::validation::validate_booking_date;

/// The booking coordinator. Owns the table cache and the per-cell lock
/// table; every mutation of the spreadsheet goes through here so that
/// cache, locks, and local records stay coherent.
pub struct BookingService {
    client: Arc<dyn SheetsApi>,
    store: Arc<UserStore>,
    sheet: String,
    cache: TableCache,
    locks: CellLocks,
}

impl BookingService {
    pub fn new(
        client: Arc<dyn SheetsApi>,
        store: Arc<UserStore>,
        sheet: &str,
        cache_ttl: Duration,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            cache: TableCache::new(client.clone(), sheet, cache_ttl),
            locks: CellLocks::new(lock_timeout),
            client,
            store,
            sheet: sheet.to_string(),
        }
    }

    /// Current table snapshot, through the cache.
    pub async fn table(&self, force_refresh: bool) -> Arc<TableSnapshot> {
        self.cache.get(force_refresh).await
    }

    /// Books a slot for the user's stored display name on `target_date`
    /// (`dd.mm`). Holds the cell lock across freshness check, remote
    /// write, and local record; the guard releases it on every exit.
    pub async fn book_slot(
        &self,
        user_id: u64,
        day: Day,
        band: TimeBand,
        target_date: &str,
    ) -> Result<(), BookingError> {
        // The date arrives via callback data, which the client can forge;
        // an unvalidated token written into a cell would make the slot
        // unreadable for everyone.
        let target_date = validate_booking_date(target_date)
            .map_err(|_| BookingError::InvalidDate(target_date.to_string()))?;

        let name = self
            .store
            .get_name(user_id)
            .await
            .ok_or(BookingError::NoName)?;
        let cell = grid::cell_address(day, band);

        let _guard = self.locks.acquire(&cell).await.ok_or(BookingError::Busy)?;

        // Freshness check straight from the sheet: the cached grid may be
        // up to a TTL old, which is fine for browsing but not for writes.
        let rows = self
            .client
            .get_data(&self.sheet, &cell)
            .await
            .map_err(|e| BookingError::Remote(format!("{e:#}")))?;
        let current = rows
            .first()
            .and_then(|row| row.first())
            .map(String::as_str)
            .unwrap_or("");

        match availability_for_date(current, &target_date) {
            Availability::Free => {}
            Availability::Occupied { by } => {
                return Err(BookingError::Occupied {
                    by,
                    date: target_date.clone(),
                });
            }
            Availability::Unreadable => {
                return Err(BookingError::Unreadable {
                    raw: current.trim().to_string(),
                });
            }
        }

        let record = booking_record(&name, &target_date);
        let written = self
            .client
            .write_value(&self.sheet, &cell, &record)
            .await
            .map_err(|e| BookingError::Remote(format!("{e:#}")))?;
        if !written {
            return Err(BookingError::Remote("write rejected".to_string()));
        }

        // The sheet write already succeeded; a local record failure is
        // logged and left for reconciliation rather than surfaced as a
        // failed booking.
        if let Err(e) = self.store.add_booking(user_id, &cell, &target_date).await {
            warn!("booked {cell} but local record failed: {e:#}");
        }
        self.cache.invalidate().await;

        info!("user {user_id} booked {cell} for {target_date}");
        Ok(())
    }

    /// Deletes the user's booking in `cell`. Ownership is checked through
    /// the reverse index before the lock is even attempted.
    pub async fn delete_booking(&self, cell: &str, user_id: u64) -> Result<(), BookingError> {
        match self.store.owner_of(cell).await {
            Some(owner) if owner == user_id => {}
            _ => return Err(BookingError::NotOwner),
        }

        let _guard = self.locks.acquire(cell).await.ok_or(BookingError::Busy)?;

        let cleared = self
            .client
            .clear_cell(&self.sheet, cell)
            .await
            .map_err(|e| BookingError::Remote(format!("{e:#}")))?;
        if !cleared {
            return Err(BookingError::Remote("clear rejected".to_string()));
        }

        if let Err(e) = self.store.remove_booking(cell).await {
            warn!("cleared {cell} but local record removal failed: {e:#}");
        }
        self.cache.invalidate().await;

        info!("user {user_id} deleted booking {cell}");
        Ok(())
    }

    /// Bands still free on `day` for `target_date`, judged from the
    /// cached snapshot. The selection UI tolerates TTL staleness; the
    /// authoritative check happens again under the cell lock on booking.
    pub async fn free_bands_for_day(&self, day: Day, target_date: &str) -> Vec<TimeBand> {
        let snapshot = self.cache.get(false).await;
        if snapshot.is_empty() {
            // No data is not the same as fully booked.
            return TimeBand::ALL.to_vec();
        }

        let col_idx = day.column_index();
        TimeBand::ALL
            .iter()
            .copied()
            .filter(|band| {
                let content = snapshot.cell(band.row_index(), col_idx).unwrap_or("");
                matches!(
                    availability_for_date(content, target_date),
                    Availability::Free
                )
            })
            .collect()
    }

    /// Force-refreshes the table and prunes the user's stale local
    /// bookings against it. Returns the surviving cell -> date set.
    pub async fn reconcile_user(&self, user_id: u64) -> Result<HashMap<String, String>> {
        let snapshot = self.cache.get(true).await;
        self.store.sync_user_bookings(user_id, &snapshot).await
    }

    /// Prunes stale bookings for every known user against one fresh
    /// snapshot. Used by the periodic sweeper.
    pub async fn reconcile_all_users(&self) -> Result<usize> {
        let snapshot = self.cache.get(true).await;
        if snapshot.is_empty() {
            warn!("sweep skipped: table snapshot unavailable");
            return Ok(0);
        }

        let mut pruned = 0;
        for user_id in self.store.user_ids().await {
            let before = self.store.bookings_for(user_id).await.len();
            let after = self
                .store
                .sync_user_bookings(user_id, &snapshot)
                .await?
                .len();
            pruned += before.saturating_sub(after);
        }
        Ok(pruned)
    }

    /// One-cell probe of the spreadsheet, for readiness checks.
    pub async fn probe_remote(&self) -> bool {
        self.client.get_data(&self.sheet, "A1:A1").await.is_ok()
    }

    /// Age of the cached snapshot in seconds, if one exists.
    pub async fn cache_age_secs(&self) -> Option<u64> {
        self.cache.age().await.map(|age| age.as_secs())
    }

    /// Wall-clock fetch time of the cached snapshot, for the health report.
    pub async fn cache_fetched_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.cache.fetched_at().await
    }
}
