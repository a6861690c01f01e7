//! Storage layer and ledger engine for the gas cylinder ledger.
//!
//! This crate provides the append-only event store and the [`Ledger`] engine
//! that sells and returns cylinders on top of it.
//!
//! # Architecture
//!
//! Every store keeps two things:
//!
//! - the event log, keyed by sequence id
//! - a latest-event index, one entry per `(gas, cylinder code)`, pointing at
//!   the event that currently decides the cylinder's state
//!
//! The index is updated in the same write as the event it points at, so
//! resolver queries never need to scan the log. Sales and returns check the
//! index and append under a lock scoped to the cylinder, which makes the
//! check-then-insert atomic per cylinder while different cylinders proceed in
//! parallel.
//!
//! # Backends
//!
//! - [`MemoryStore`]: always available, used in tests and when no database is
//!   configured.
//! - `RocksStore`: persistent, behind the `rocksdb-backend` feature (enabled by
//!   default).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cylinder_ledger_core::GasCatalog;
//! use cylinder_ledger_store::{Ledger, MemoryStore, SellOrder};
//!
//! let ledger = Ledger::new(Arc::new(MemoryStore::new()), GasCatalog::default(), 500);
//!
//! ledger
//!     .sell(&SellOrder {
//!         gas: "Oxygen",
//!         numbers: "1-3",
//!         customer_name: "Asha",
//!         phone: None,
//!         national_id: None,
//!     })
//!     .unwrap();
//!
//! let codes = ledger.active_codes("Oxygen").unwrap();
//! assert_eq!(codes.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod ledger;
pub mod locks;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use ledger::{Ledger, SellOrder, SellReceipt};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use cylinder_ledger_core::{
    ActiveCylinder, ActiveFilter, Attribution, CylinderKey, EventSeq, HistoryQuery, LedgerEvent,
};

/// The storage trait defining all ledger operations.
///
/// Implementations must make [`Store::record_sale`] and
/// [`Store::record_return`] atomic per cylinder: the state check and the
/// append behave as one step with respect to other writers on the same
/// `(gas, code)`.
pub trait Store: Send + Sync {
    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a `SELL` for the cylinder unless it is already active.
    ///
    /// The stored timestamp is `at`, raised if needed so the new event is
    /// never older than the cylinder's previous event.
    ///
    /// # Errors
    ///
    /// - `StoreError::AlreadyActive` if the cylinder's latest event is a `SELL`.
    /// - `StoreError::Database` / `StoreError::Serialization` on storage failure.
    fn record_sale(
        &self,
        cylinder: &CylinderKey,
        attribution: &Attribution,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent>;

    /// Append a `RETURN` closing the cylinder's active sale.
    ///
    /// The return carries the sale's attribution. Its timestamp is adjusted
    /// like in [`Store::record_sale`].
    ///
    /// # Errors
    ///
    /// - `StoreError::NotActive` if the cylinder has no active sale.
    /// - `StoreError::Database` / `StoreError::Serialization` on storage failure.
    fn record_return(&self, cylinder: &CylinderKey, at: DateTime<Utc>) -> Result<LedgerEvent>;

    // =========================================================================
    // Queries
    // =========================================================================

    /// The event currently deciding a cylinder's state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn latest_event(&self, cylinder: &CylinderKey) -> Result<Option<LedgerEvent>>;

    /// Get an event by sequence id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_event(&self, seq: EventSeq) -> Result<Option<LedgerEvent>>;

    /// Active cylinders matching the filter, ordered by gas then code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn active_cylinders(&self, filter: &ActiveFilter) -> Result<Vec<ActiveCylinder>>;

    /// Events matching the query, newest first (timestamp, then sequence id).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_events(&self, query: &HistoryQuery) -> Result<Vec<LedgerEvent>>;

    /// Total number of events in the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn event_count(&self) -> Result<u64>;
}

/// The timestamp to store for a new event on a cylinder.
///
/// Keeps each cylinder's events non-decreasing in time so that the appended
/// event is always the cylinder's latest.
fn stamp_after(previous: Option<&LedgerEvent>, at: DateTime<Utc>) -> DateTime<Utc> {
    previous.map_or(at, |prev| at.max(prev.timestamp))
}

/// Sort events newest first and apply the query limit.
fn newest_first(mut events: Vec<LedgerEvent>, query: &HistoryQuery) -> Vec<LedgerEvent> {
    events.sort_by(|a, b| b.ledger_order(a));
    if let Some(limit) = query.limit {
        events.truncate(limit);
    }
    events
}
