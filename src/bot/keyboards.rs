use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::grid::{Day, TimeBand};
use crate::utils::format::describe_slot;

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🔄 Refresh", "refresh")],
        vec![InlineKeyboardButton::callback("📝 Book a slot", "book")],
        vec![InlineKeyboardButton::callback("📋 My bookings", "bookings")],
    ])
}

pub fn days() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Day::ALL
        .iter()
        .map(|day| {
            vec![InlineKeyboardButton::callback(
                day.full_name(),
                format!("day:{}", day.label()),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("❌ Cancel", "cancel")]);
    InlineKeyboardMarkup::new(rows)
}

/// Time keyboard for one day: free bands are selectable and carry the
/// target date in the callback data; taken bands are inert.
pub fn times(day: Day, target_date: &str, free: &[TimeBand]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = TimeBand::ALL
        .iter()
        .map(|band| {
            if free.contains(band) {
                vec![InlineKeyboardButton::callback(
                    format!("✅ {}", band.label()),
                    format!("time:{}:{}:{}", day.label(), band.row(), target_date),
                )]
            } else {
                vec![InlineKeyboardButton::callback(
                    format!("❌ {} (taken)", band.label()),
                    "noop",
                )]
            }
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "◀️ Back to days",
        "back:days",
    )]);
    rows.push(vec![InlineKeyboardButton::callback("❌ Cancel", "cancel")]);
    InlineKeyboardMarkup::new(rows)
}

/// One button per active booking, sorted by date upstream.
pub fn bookings_list(bookings: &[(String, String)]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = bookings
        .iter()
        .map(|(cell, date)| {
            vec![InlineKeyboardButton::callback(
                format!("📍 {} ({})", describe_slot(cell), date),
                format!("manage:{cell}"),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("◀️ Menu", "menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn delete_confirm(cell: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🗑 Yes, delete",
            format!("del:{cell}"),
        )],
        vec![InlineKeyboardButton::callback("◀️ Back", "bookings")],
    ])
}
