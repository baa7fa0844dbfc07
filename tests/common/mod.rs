//! In-memory spreadsheet double shared by the integration suites. It
//! behaves like a real sheet: writes are visible to later reads, so
//! concurrency tests observe genuine interleavings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use laundry_slot_bot::sheets::{CellUpdate, SheetsApi};

const GRID_ROWS: usize = 9;
const GRID_COLS: usize = 14;

#[derive(Default)]
pub struct MockSheets {
    cells: Mutex<HashMap<String, String>>,
    /// Full-range and single-cell reads both count.
    pub read_count: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub reject_writes: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

impl MockSheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(pairs: &[(&str, &str)]) -> Self {
        let mock = Self::new();
        for (cell, value) in pairs {
            mock.set_cell(cell, value);
        }
        mock
    }

    pub fn set_cell(&self, cell: &str, value: &str) {
        self.cells
            .lock()
            .unwrap()
            .insert(cell.to_string(), value.to_string());
    }

    pub fn cell(&self, cell: &str) -> Option<String> {
        self.cells
            .lock()
            .unwrap()
            .get(cell)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    pub fn reads(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    fn full_grid(&self) -> Vec<Vec<String>> {
        let cells = self.cells.lock().unwrap();
        let mut rows = vec![vec![String::new(); GRID_COLS]; GRID_ROWS];
        for (addr, value) in cells.iter() {
            if let Some((row_idx, col_idx)) = indices(addr) {
                if row_idx < GRID_ROWS && col_idx < GRID_COLS {
                    rows[row_idx][col_idx] = value.clone();
                }
            }
        }
        rows
    }
}

fn indices(addr: &str) -> Option<(usize, usize)> {
    let mut chars = addr.chars();
    let column = chars.next()?;
    let row: usize = chars.as_str().parse().ok()?;
    if !column.is_ascii_uppercase() || row == 0 {
        return None;
    }
    Some((row - 1, (column as u8 - b'A') as usize))
}

#[async_trait]
impl SheetsApi for MockSheets {
    async fn get_data(&self, _sheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated spreadsheet outage"));
        }
        self.read_count.fetch_add(1, Ordering::SeqCst);

        if range.contains(':') {
            Ok(self.full_grid())
        } else {
            match self.cell(range) {
                Some(value) => Ok(vec![vec![value]]),
                None => Ok(vec![]),
            }
        }
    }

    async fn write_value(&self, _sheet: &str, cell: &str, value: &str) -> Result<bool> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.set_cell(cell, value);
        Ok(true)
    }

    async fn clear_cell(&self, sheet: &str, cell: &str) -> Result<bool> {
        self.write_value(sheet, cell, "").await
    }

    async fn batch_update(&self, _sheet: &str, updates: &[CellUpdate]) -> Result<bool> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        for update in updates {
            if let Some(value) = update.values.first().and_then(|row| row.first()) {
                self.set_cell(&update.range, value);
            }
        }
        Ok(true)
    }
}
