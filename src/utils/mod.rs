pub mod datetime;
pub mod format;
pub mod logging;
pub mod validation;
