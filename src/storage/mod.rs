//! Durable local store of users and their active bookings, persisted as a
//! single JSON document next to the bot. Two top-level maps are kept
//! mutually consistent under every mutation: `users` (per-user booking
//! points) and `global_map` (reverse cell -> owner index).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::booking::availability::parse_cell_record;
use crate::booking::cache::TableSnapshot;
use crate::grid;
use crate::utils::datetime::is_date_expired;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: Option<String>,
    /// Active bookings: cell address -> target date (`dd.mm`).
    #[serde(default)]
    pub points: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOwner {
    pub user_id: u64,
    pub date: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    users: HashMap<String, UserRecord>,
    #[serde(default)]
    global_map: HashMap<String, CellOwner>,
}

/// JSON-file-backed user store. All mutations write through to disk
/// before returning.
pub struct UserStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl UserStore {
    /// Opens the store, loading existing data when the file is present.
    pub fn load(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read user store {}", path.display()))?;
            let data: StoreData = serde_json::from_str(&raw)
                .with_context(|| format!("malformed user store {}", path.display()))?;
            info!(
                "loaded {} users, {} active bookings from {}",
                data.users.len(),
                data.global_map.len(),
                path.display()
            );
            data
        } else {
            info!("user store {} not found, starting empty", path.display());
            StoreData::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            data: RwLock::new(data),
        })
    }

    pub async fn user_exists(&self, user_id: u64) -> bool {
        self.data.read().await.users.contains_key(&user_id.to_string())
    }

    pub async fn add_user(&self, user_id: u64) -> Result<()> {
        let mut data = self.data.write().await;
        data.users.entry(user_id.to_string()).or_default();
        self.persist(&data)
    }

    pub async fn get_name(&self, user_id: u64) -> Option<String> {
        self.data
            .read()
            .await
            .users
            .get(&user_id.to_string())
            .and_then(|user| user.name.clone())
    }

    pub async fn set_name(&self, user_id: u64, name: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.users.entry(user_id.to_string()).or_default().name = Some(name.to_string());
        self.persist(&data)
    }

    /// Whether another user already claimed this display name. Names are
    /// what ends up in cells, so duplicates would make bookings ambiguous.
    pub async fn is_name_taken_by_other(&self, name: &str, user_id: u64) -> bool {
        let wanted = name.to_lowercase();
        let own_key = user_id.to_string();
        self.data.read().await.users.iter().any(|(id, user)| {
            *id != own_key
                && user
                    .name
                    .as_ref()
                    .is_some_and(|n| n.to_lowercase() == wanted)
        })
    }

    pub async fn user_count(&self) -> usize {
        self.data.read().await.users.len()
    }

    pub async fn user_ids(&self) -> Vec<u64> {
        self.data
            .read()
            .await
            .users
            .keys()
            .filter_map(|id| id.parse().ok())
            .collect()
    }

    /// The user's active bookings: cell -> date.
    pub async fn bookings_for(&self, user_id: u64) -> HashMap<String, String> {
        self.data
            .read()
            .await
            .users
            .get(&user_id.to_string())
            .map(|user| user.points.clone())
            .unwrap_or_default()
    }

    /// Owner of a cell according to the reverse index.
    pub async fn owner_of(&self, cell: &str) -> Option<u64> {
        self.data
            .read()
            .await
            .global_map
            .get(cell)
            .map(|owner| owner.user_id)
    }

    /// Records a booking in both maps. A previous owner of the same cell
    /// loses their point entry so the maps stay consistent.
    pub async fn add_booking(&self, user_id: u64, cell: &str, date: &str) -> Result<()> {
        let mut data = self.data.write().await;

        if let Some(previous) = data.global_map.get(cell).cloned() {
            if previous.user_id != user_id {
                if let Some(user) = data.users.get_mut(&previous.user_id.to_string()) {
                    user.points.remove(cell);
                }
            }
        }

        data.users
            .entry(user_id.to_string())
            .or_default()
            .points
            .insert(cell.to_string(), date.to_string());
        data.global_map.insert(
            cell.to_string(),
            CellOwner {
                user_id,
                date: date.to_string(),
            },
        );
        self.persist(&data)
    }

    /// Removes a booking from both maps, whoever owned it.
    pub async fn remove_booking(&self, cell: &str) -> Result<()> {
        let mut data = self.data.write().await;

        if let Some(owner) = data.global_map.remove(cell) {
            if let Some(user) = data.users.get_mut(&owner.user_id.to_string()) {
                user.points.remove(cell);
            }
        }
        self.persist(&data)
    }

    /// Reconciles one user's local bookings against the latest snapshot,
    /// pruning records the spreadsheet no longer corroborates: expired
    /// dates, cells gone from the grid, cleared or overwritten cells, and
    /// content that no longer parses. Returns the surviving set.
    ///
    /// An absent snapshot removes nothing: a failed fetch must never cause
    /// local data loss.
    pub async fn sync_user_bookings(
        &self,
        user_id: u64,
        snapshot: &TableSnapshot,
    ) -> Result<HashMap<String, String>> {
        if snapshot.is_empty() {
            debug!("sync skipped for user {user_id}: no table data");
            return Ok(self.bookings_for(user_id).await);
        }

        let mut data = self.data.write().await;
        let key = user_id.to_string();

        let (name, points) = match data.users.get(&key) {
            Some(user) => (user.name.clone().unwrap_or_default(), user.points.clone()),
            None => return Ok(HashMap::new()),
        };

        let mut stale: Vec<(String, &str)> = Vec::new();
        for (cell, date) in &points {
            if let Some(reason) = Self::staleness_reason(cell, date, &name, snapshot) {
                stale.push((cell.clone(), reason));
            }
        }

        if stale.is_empty() {
            return Ok(points);
        }

        for (cell, reason) in &stale {
            info!("sync: dropping booking {cell} of user {user_id} ({reason})");
            data.global_map.remove(cell);
            if let Some(user) = data.users.get_mut(&key) {
                user.points.remove(cell);
            }
        }
        self.persist(&data)?;

        Ok(data
            .users
            .get(&key)
            .map(|user| user.points.clone())
            .unwrap_or_default())
    }

    fn staleness_reason(
        cell: &str,
        date: &str,
        user_name: &str,
        snapshot: &TableSnapshot,
    ) -> Option<&'static str> {
        if is_date_expired(date) {
            return Some("expired");
        }

        let Some((row_idx, col_idx)) = grid::cell_indices(cell) else {
            return Some("vanished");
        };
        let Some(row) = snapshot.rows.get(row_idx) else {
            return Some("vanished");
        };

        // The API trims trailing empty cells, so a short row means empty.
        let content = row.get(col_idx).map(|s| s.trim()).unwrap_or("");
        if content.is_empty() {
            return Some("cleared externally");
        }

        match parse_cell_record(content) {
            None => Some("corrupted"),
            Some(record) if record.name.to_lowercase() != user_name.to_lowercase() => {
                Some("overwritten by someone else")
            }
            Some(_) => None,
        }
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(data).context("failed to encode user store")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write user store {}", self.path.display()))?;
        Ok(())
    }
}
