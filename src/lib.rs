//! # Laundry Slot Bot
//!
//! A Telegram bot for booking washing-machine time slots in a shared
//! weekly spreadsheet grid.
//!
//! ## Features
//! - Day/time slot booking through inline keyboards
//! - Cell-level locking so concurrent bookings never collide
//! - TTL-cached table snapshots with double-checked refresh
//! - Date-aware conflict detection (different weeks share a cell)
//! - Local JSON record of users and bookings, self-healed against the sheet

/// Booking coordination: cache, per-cell locks, availability, coordinator
pub mod booking;
/// Bot command handlers, callbacks, and keyboards
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// The fixed weekly grid and its cell addressing
pub mod grid;
/// Background services: health endpoints and the reconciliation sweeper
pub mod services;
/// Remote spreadsheet collaborator (trait + REST client)
pub mod sheets;
/// Durable local store of users and their bookings
pub mod storage;
/// Utility functions for dates, validation, and formatting
pub mod utils;
