use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::booking::BookingService;
use crate::storage::UserStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub users_registered: usize,
    pub cache_age_seconds: Option<u64>,
    pub cache_fetched_at: Option<DateTime<Utc>>,
    pub spreadsheet: SpreadsheetHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpreadsheetHealth {
    pub status: String,
    pub response_time_ms: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
    pub store: Arc<UserStore>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(service: Arc<BookingService>, store: Arc<UserStore>) -> Self {
        let state = AppState {
            service,
            store,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    let sheets_reachable = state.service.probe_remote().await;
    let sheets_status = if sheets_reachable { "healthy" } else { "unhealthy" };

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let health_response = HealthResponse {
        status: sheets_status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        users_registered: state.store.user_count().await,
        cache_age_seconds: state.service.cache_age_secs().await,
        cache_fetched_at: state.service.cache_fetched_at().await,
        spreadsheet: SpreadsheetHealth {
            status: sheets_status.to_string(),
            response_time_ms,
        },
    };

    if sheets_reachable {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    if state.service.probe_remote().await {
        Ok(Json("ready"))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
