//! Pure availability rules for a single cell. No I/O happens here; the
//! coordinator feeds in raw cell text from either the cache or a direct
//! remote read.

/// A booking as encoded in a spreadsheet cell: `"<Name> dd.mm"` with the
/// date always the last whitespace-separated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRecord {
    pub name: String,
    pub date: String,
}

/// Whether a cell can be written for a particular target date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Free,
    Occupied { by: String },
    /// Non-empty content that does not parse. Treated as occupied so a
    /// manual edit never gets silently overwritten.
    Unreadable,
}

/// Parses `"<Name> dd.mm"`. The name may contain internal spaces; only
/// the trailing token has to look like a date. Calendar validity is not
/// checked here; user input is validated before it ever reaches a cell.
pub fn parse_cell_record(text: &str) -> Option<CellRecord> {
    let text = text.trim();
    let (name, date) = text.rsplit_once(char::is_whitespace)?;
    let name = name.trim();

    if name.is_empty() || !is_date_token(date) {
        return None;
    }

    Some(CellRecord {
        name: name.to_string(),
        date: date.to_string(),
    })
}

fn is_date_token(token: &str) -> bool {
    let Some((day, month)) = token.split_once('.') else {
        return false;
    };
    let digits = |part: &str| {
        (1..=2).contains(&part.len()) && part.chars().all(|c| c.is_ascii_digit())
    };
    digits(day) && digits(month)
}

/// The availability invariant: empty cells are free, a different-week
/// (different date) booking may share the physical cell, same-date content
/// is occupied, and anything unparseable is occupied.
pub fn availability_for_date(cell_text: &str, target_date: &str) -> Availability {
    let text = cell_text.trim();
    if text.is_empty() {
        return Availability::Free;
    }

    match parse_cell_record(text) {
        None => Availability::Unreadable,
        Some(record) if record.date == target_date => Availability::Occupied { by: record.name },
        Some(_) => Availability::Free,
    }
}

/// Builds the cell content for a new booking, collapsing stray whitespace
/// in the name so the record stays parseable.
pub fn booking_record(name: &str, target_date: &str) -> String {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{cleaned} {target_date}")
}
