use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub spreadsheet_id: String,
    pub sheets_api_token: String,
    pub sheet_name: String,
    pub storage_path: String,
    pub http_port: u16,
    pub cache_ttl_secs: u64,
    pub lock_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let spreadsheet_id = env::var("SPREADSHEET_ID")
            .map_err(|_| anyhow!("SPREADSHEET_ID must be set"))?;
        if spreadsheet_id.trim().is_empty() {
            return Err(anyhow!("SPREADSHEET_ID must be set"));
        }

        let sheets_api_token = env::var("SHEETS_API_TOKEN")
            .map_err(|_| anyhow!("SHEETS_API_TOKEN must be set"))?;
        if sheets_api_token.trim().is_empty() {
            return Err(anyhow!("SHEETS_API_TOKEN must be set"));
        }

        let sheet_name = non_empty_or(env::var("SHEET_NAME").ok(), "Sheet1");
        let storage_path = non_empty_or(env::var("STORAGE_PATH").ok(), "./data/users.json");

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let cache_ttl_secs = parse_secs("CACHE_TTL_SECS", 60)?;
        let lock_timeout_secs = parse_secs("LOCK_TIMEOUT_SECS", 10)?;

        Ok(Config {
            telegram_bot_token: token,
            spreadsheet_id,
            sheets_api_token,
            sheet_name,
            storage_path,
            http_port,
            cache_ttl_secs,
            lock_timeout_secs,
        })
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn parse_secs(var: &str, default: u64) -> Result<u64> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {var}: {raw}")),
        Err(_) => Ok(default),
    }
}
