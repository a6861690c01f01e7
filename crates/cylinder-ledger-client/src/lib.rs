//! Cylinder Ledger Client SDK.
//!
//! This crate provides an async client for the cylinder ledger HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use cylinder_ledger_client::{LedgerClient, SellRequest};
//!
//! # async fn example() -> Result<(), cylinder_ledger_client::ClientError> {
//! let client = LedgerClient::new("http://localhost:4000")?;
//!
//! let sold = client
//!     .sell(&SellRequest::new("Oxygen", "1,3,5-7", "Asha").with_phone("98450 11111"))
//!     .await?;
//! println!("sold {} cylinders", sold.sold.len());
//!
//! let codes = client.active_codes("Oxygen").await?;
//! println!("{} oxygen cylinders out", codes.count);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, LedgerClient};
pub use error::ClientError;
pub use types::*;
