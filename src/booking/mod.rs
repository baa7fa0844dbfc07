//! Booking coordination: snapshot caching, per-cell locking, date-aware
//! availability, and the coordinator tying them to the local store.

pub mod availability;
pub mod cache;
pub mod locks;
pub mod outcome;
pub mod service;

pub use cache::{TableCache, TableSnapshot};
pub use outcome::BookingError;
pub use service::BookingService;
