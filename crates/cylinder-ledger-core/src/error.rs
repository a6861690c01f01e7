//! Error types for ledger input validation.

/// Result type for ledger domain operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised while validating ledger input, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A required field was missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The gas type is not part of the configured catalog.
    #[error("unknown gas type: {0}")]
    UnknownGas(String),

    /// The number specification produced no usable serials.
    #[error("no cylinder numbers in '{0}'")]
    EmptyNumberSet(String),

    /// The number specification expands to more cylinders than allowed.
    #[error("batch exceeds {limit} cylinders")]
    BatchTooLarge {
        /// Maximum number of cylinders per batch.
        limit: usize,
    },

    /// A cylinder code could not be parsed.
    #[error("invalid cylinder code: '{0}'")]
    InvalidCylinderCode(String),

    /// A history date filter was neither `YYYY` nor `YYYY-MM`.
    #[error("invalid date filter: '{0}'")]
    InvalidDateFilter(String),
}
