use crate::booking::cache::TableSnapshot;
use crate::grid::{self, Day, TimeBand};

/// Escapes user-supplied text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the full weekly schedule as an HTML message: one section per
/// day, one line per band, occupied cells shown verbatim (escaped).
pub fn render_schedule(snapshot: &TableSnapshot) -> String {
    if snapshot.is_empty() {
        return "📭 The table is empty".to_string();
    }

    let mut lines = vec!["📅 <b>LAUNDRY SCHEDULE</b>".to_string()];

    for day in Day::ALL {
        lines.push(format!("\n<b>{}</b>", day.full_name()));
        lines.push("─".repeat(20));

        for band in TimeBand::ALL {
            let content = snapshot
                .cell(band.row_index(), day.column_index())
                .unwrap_or("")
                .trim();

            if content.is_empty() {
                lines.push(format!("🟢 <b>{}</b>: free", band.label()));
            } else {
                lines.push(format!(
                    "🔴 <b>{}</b>: {}",
                    band.label(),
                    escape_html(content)
                ));
            }
        }
    }

    lines.join("\n")
}

/// Human-readable slot for a cell address, e.g. `Monday 10:00-11:00`.
/// Falls back to the raw address for anything outside the grid.
pub fn describe_slot(cell: &str) -> String {
    match grid::slot_for_cell(cell) {
        Some((day, band)) => format!("{} {}", day.full_name(), band.label()),
        None => cell.to_string(),
    }
}

/// Splits a long message at line boundaries so each chunk fits under
/// Telegram's length limit.
pub fn split_message(text: &str, max_length: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_length {
        let hard_cut: usize = rest.chars().take(max_length).map(char::len_utf8).sum();
        let cut = match rest[..hard_cut].rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => hard_cut,
        };
        messages.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        messages.push(rest.to_string());
    }

    messages
}
