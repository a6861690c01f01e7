//! API handlers.

pub mod cylinders;
pub mod health;
pub mod reports;
