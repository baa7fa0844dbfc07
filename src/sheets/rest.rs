use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{CellUpdate, SheetsApi};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets `values` REST client. Authentication is a bearer token
/// provided by the environment; token provisioning lives outside the bot.
pub struct RestSheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl RestSheetsClient {
    pub fn new(spreadsheet_id: &str, api_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.to_string(),
            api_token: api_token.to_string(),
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!("{BASE_URL}/{}/values{suffix}", self.spreadsheet_id)
    }
}

#[async_trait]
impl SheetsApi for RestSheetsClient {
    async fn get_data(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&format!("/{sheet}!{range}"));
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("spreadsheet read request failed")?;

        let response = response
            .error_for_status()
            .context("spreadsheet read rejected")?;

        let body: ValuesResponse = response
            .json()
            .await
            .context("malformed spreadsheet response")?;
        Ok(body.values)
    }

    async fn write_value(&self, sheet: &str, cell: &str, value: &str) -> Result<bool> {
        let url = self.values_url(&format!("/{sheet}!{cell}"));
        let body = json!({ "values": [[value]] });

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await
            .context("spreadsheet write request failed")?;

        if response.status().is_success() {
            Ok(true)
        } else {
            warn!(
                "spreadsheet write to {sheet}!{cell} rejected: {}",
                response.status()
            );
            Ok(false)
        }
    }

    async fn clear_cell(&self, sheet: &str, cell: &str) -> Result<bool> {
        self.write_value(sheet, cell, "").await
    }

    async fn batch_update(&self, sheet: &str, updates: &[CellUpdate]) -> Result<bool> {
        let data: Vec<_> = updates
            .iter()
            .map(|upd| {
                json!({
                    "range": format!("{sheet}!{}", upd.range),
                    "values": upd.values,
                })
            })
            .collect();
        let body = json!({ "valueInputOption": "RAW", "data": data });

        let url = self.values_url(":batchUpdate");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("spreadsheet batch update request failed")?;

        if response.status().is_success() {
            Ok(true)
        } else {
            warn!("spreadsheet batch update rejected: {}", response.status());
            Ok(false)
        }
    }
}
