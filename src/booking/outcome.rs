use thiserror::Error;

/// Everything that can stop a booking mutation. Remote failures never
/// bubble out of the coordinator as anything but a variant here, so the
/// presentation layer always has a human-readable reason to show.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Retryable: another request holds the cell lock.
    #[error("the slot is busy right now, try again in a few seconds")]
    Busy,

    /// Not retryable for this date; another date may still work.
    #[error("already taken for {date} by {by}")]
    Occupied { by: String, date: String },

    /// Non-empty cell content that does not parse; treated as occupied.
    #[error("cannot read the current booking in that slot: {raw}")]
    Unreadable { raw: String },

    /// Malformed target date in the request; nothing was written.
    #[error("invalid booking date: {0}")]
    InvalidDate(String),

    /// Spreadsheet API failure. Local state is left untouched.
    #[error("spreadsheet error: {0}")]
    Remote(String),

    /// The user never set a display name; no lock was taken.
    #[error("no display name on file, set one with /name first")]
    NoName,

    /// Deleting a booking that belongs to another user.
    #[error("that booking belongs to someone else")]
    NotOwner,
}
