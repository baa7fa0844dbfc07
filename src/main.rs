//! # Laundry Slot Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the local user store,
//! wires the booking coordinator to the spreadsheet client, starts the
//! reconciliation sweeper, and runs the Telegram bot alongside the
//! health-check server.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use laundry_slot_bot::booking::BookingService;
use laundry_slot_bot::bot::BotHandler;
use laundry_slot_bot::config::Config;
use laundry_slot_bot::services::health::HealthService;
use laundry_slot_bot::services::sweeper::SweeperService;
use laundry_slot_bot::sheets::RestSheetsClient;
use laundry_slot_bot::storage::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laundry_slot_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Laundry Slot Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Sheet: {}, Storage: {}, HTTP Port: {}",
        config.sheet_name, config.storage_path, config.http_port
    );

    // Open the local user store
    let store = Arc::new(UserStore::load(Path::new(&config.storage_path))?);

    // Wire the booking coordinator to the spreadsheet
    let client = Arc::new(RestSheetsClient::new(
        &config.spreadsheet_id,
        &config.sheets_api_token,
    ));
    let service = Arc::new(BookingService::new(
        client,
        store.clone(),
        &config.sheet_name,
        Duration::from_secs(config.cache_ttl_secs),
        Duration::from_secs(config.lock_timeout_secs),
    ));

    // Initialize bot
    info!("Initializing Telegram bot...");
    let telegram_bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(service.clone(), store.clone());
    info!("Telegram bot initialized successfully");

    // Initialize and start the reconciliation sweeper
    let mut sweeper = match SweeperService::new(service.clone()).await {
        Ok(sweeper) => sweeper,
        Err(e) => {
            tracing::error!("Failed to create sweeper service: {}", e);
            return Err(anyhow::anyhow!("Failed to create sweeper service: {}", e));
        }
    };

    if let Err(e) = sweeper.start().await {
        tracing::error!("Failed to start sweeper service: {}", e);
    } else {
        info!("Sweeper service started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(service.clone(), store.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(telegram_bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop the sweeper on shutdown
    if let Err(e) = sweeper.stop().await {
        tracing::warn!("Error stopping sweeper service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
