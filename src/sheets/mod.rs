//! Remote spreadsheet collaborator. The booking core only ever talks to
//! the [`SheetsApi`] trait; the REST implementation is a thin transport
//! with no booking logic of its own.

use anyhow::Result;
use async_trait::async_trait;

pub mod rest;

pub use rest::RestSheetsClient;

/// One ranged write inside a batch update.
#[derive(Debug, Clone)]
pub struct CellUpdate {
    pub range: String,
    pub values: Vec<Vec<String>>,
}

/// Key-range read/write access to the remote spreadsheet.
///
/// Every call crosses the network, is fallible, and should be assumed to
/// take hundreds of milliseconds. Transport errors surface as `Err`;
/// API-level rejections come back as `Ok(false)` from the write calls.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn get_data(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>>;

    async fn write_value(&self, sheet: &str, cell: &str, value: &str) -> Result<bool>;

    async fn clear_cell(&self, sheet: &str, cell: &str) -> Result<bool>;

    async fn batch_update(&self, sheet: &str, updates: &[CellUpdate]) -> Result<bool>;
}
