//! Core types and utilities for the gas cylinder ledger.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - **Gases**: `GasType`, `GasCatalog`
//! - **Cylinders**: `CylinderCode`, `CylinderKey`, `NumberSet`
//! - **Ledger events**: `LedgerEvent`, `NewEvent`, `Action`, `Attribution`, `EventSeq`
//! - **Resolution**: `ActiveFilter`, `ActiveCylinder`, `active_cylinders`
//! - **History**: `DateFilter`, `HistoryQuery`
//!
//! # Cylinder State
//!
//! There is no cylinder registry. A cylinder `(gas, code)` exists only through
//! the events recorded against it, and it is *active* (out with a customer)
//! exactly when its latest event is a `SELL`. "Latest" orders events by
//! timestamp first and sequence id second.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cylinder;
pub mod error;
pub mod event;
pub mod gas;
pub mod history;
pub mod numbers;
pub mod resolver;

pub use cylinder::{CylinderCode, CylinderKey};
pub use error::{LedgerError, Result};
pub use event::{Action, Attribution, EventSeq, LedgerEvent, NewEvent};
pub use gas::{GasCatalog, GasType, DEFAULT_GAS_TYPES};
pub use history::{DateFilter, HistoryQuery};
pub use numbers::NumberSet;
pub use resolver::{active_cylinders, count_by_gas, latest_events, ActiveCylinder, ActiveFilter};
