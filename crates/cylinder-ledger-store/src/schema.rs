//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Ledger events, keyed by big-endian sequence id.
    pub const EVENTS: &str = "events";

    /// Index: latest event per cylinder, keyed by `gas || 0x00 || code`.
    /// Value is the big-endian sequence id of the latest event.
    pub const LATEST: &str = "latest";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::EVENTS, cf::LATEST]
}
