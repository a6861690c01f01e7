//! Cylinder Ledger HTTP API Service.
//!
//! This crate exposes the ledger engine as a JSON API:
//!
//! - Gas catalog
//! - Selling and returning cylinders
//! - Active cylinder queries (per gas, per holder, aggregate counts)
//! - Ledger search and history dump
//!
//! The service is a thin layer. All validation and the per-cylinder
//! consistency guarantees live in [`cylinder_ledger_store::Ledger`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers call the synchronous engine

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
