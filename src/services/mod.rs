pub mod health;
pub mod sweeper;
