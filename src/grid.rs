//! Fixed weekly grid: 7 day columns by 8 time rows, addressed as
//! spreadsheet cells (`B2`..`N9`). The layout is part of the wire format
//! shared with people editing the sheet by hand, so it never changes at
//! runtime.

/// Day-of-week column in the booking grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// Spreadsheet column letter for this day. Days occupy every other
    /// column so a narrow "time" column fits between them in the sheet.
    pub fn column(self) -> char {
        match self {
            Day::Mon => 'B',
            Day::Tue => 'D',
            Day::Wed => 'F',
            Day::Thu => 'H',
            Day::Fri => 'J',
            Day::Sat => 'L',
            Day::Sun => 'N',
        }
    }

    /// Zero-based column index into a snapshot fetched from `A1:N9`.
    pub fn column_index(self) -> usize {
        (self.column() as u8 - b'A') as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Day::Mon => "Monday",
            Day::Tue => "Tuesday",
            Day::Wed => "Wednesday",
            Day::Thu => "Thursday",
            Day::Fri => "Friday",
            Day::Sat => "Saturday",
            Day::Sun => "Sunday",
        }
    }

    pub fn from_label(label: &str) -> Option<Day> {
        Day::ALL.iter().copied().find(|d| d.label() == label)
    }

    pub fn weekday(self) -> chrono::Weekday {
        match self {
            Day::Mon => chrono::Weekday::Mon,
            Day::Tue => chrono::Weekday::Tue,
            Day::Wed => chrono::Weekday::Wed,
            Day::Thu => chrono::Weekday::Thu,
            Day::Fri => chrono::Weekday::Fri,
            Day::Sat => chrono::Weekday::Sat,
            Day::Sun => chrono::Weekday::Sun,
        }
    }
}

/// One-hour washing window; eight per day starting at 08:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBand {
    H08,
    H10,
    H12,
    H14,
    H16,
    H18,
    H20,
    H22,
}

impl TimeBand {
    pub const ALL: [TimeBand; 8] = [
        TimeBand::H08,
        TimeBand::H10,
        TimeBand::H12,
        TimeBand::H14,
        TimeBand::H16,
        TimeBand::H18,
        TimeBand::H20,
        TimeBand::H22,
    ];

    /// One-based spreadsheet row of this band; row 1 is the header.
    pub fn row(self) -> usize {
        match self {
            TimeBand::H08 => 2,
            TimeBand::H10 => 3,
            TimeBand::H12 => 4,
            TimeBand::H14 => 5,
            TimeBand::H16 => 6,
            TimeBand::H18 => 7,
            TimeBand::H20 => 8,
            TimeBand::H22 => 9,
        }
    }

    /// Zero-based row index into a snapshot fetched from `A1:N9`.
    pub fn row_index(self) -> usize {
        self.row() - 1
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeBand::H08 => "08:00-09:00",
            TimeBand::H10 => "10:00-11:00",
            TimeBand::H12 => "12:00-13:00",
            TimeBand::H14 => "14:00-15:00",
            TimeBand::H16 => "16:00-17:00",
            TimeBand::H18 => "18:00-19:00",
            TimeBand::H20 => "20:00-21:00",
            TimeBand::H22 => "22:00-23:00",
        }
    }

    pub fn from_row(row: usize) -> Option<TimeBand> {
        TimeBand::ALL.iter().copied().find(|b| b.row() == row)
    }
}

/// Cell address for a (day, band) slot, e.g. `B2` for Monday 08:00.
pub fn cell_address(day: Day, band: TimeBand) -> String {
    format!("{}{}", day.column(), band.row())
}

/// Parses a cell address back into zero-based `(row, column)` snapshot
/// indices. Returns `None` for anything outside the booking grid.
pub fn cell_indices(addr: &str) -> Option<(usize, usize)> {
    let (day, band) = slot_for_cell(addr)?;
    Some((band.row_index(), day.column_index()))
}

/// Maps a cell address back to its (day, band) slot.
pub fn slot_for_cell(addr: &str) -> Option<(Day, TimeBand)> {
    let mut chars = addr.chars();
    let column = chars.next()?;
    let row: usize = chars.as_str().parse().ok()?;

    let day = Day::ALL.iter().copied().find(|d| d.column() == column)?;
    let band = TimeBand::from_row(row)?;
    Some((day, band))
}
