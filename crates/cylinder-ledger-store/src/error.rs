//! Error types for ledger storage.

use cylinder_ledger_core::{CylinderCode, GasType, LedgerError};

/// Result type for storage and ledger operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage and ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Input was rejected before anything was written.
    #[error(transparent)]
    Invalid(#[from] LedgerError),

    /// A sale hit a cylinder that is already out with a customer.
    ///
    /// `committed` lists the codes of the same batch that were sold before
    /// the collision. They stay sold.
    #[error("cylinder {code} already sold")]
    AlreadyActive {
        /// Gas of the colliding cylinder.
        gas: GasType,
        /// The colliding cylinder.
        code: CylinderCode,
        /// Codes committed earlier in the batch.
        committed: Vec<CylinderCode>,
    },

    /// No active sale exists for the cylinder.
    #[error("cylinder {code} is not currently sold")]
    NotActive {
        /// Gas of the cylinder.
        gas: GasType,
        /// The cylinder.
        code: CylinderCode,
    },
}
