//! Client error types.

/// Errors that can occur when using the ledger client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response not covered by a typed variant.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The server rejected the input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A sale hit a cylinder that is already out.
    #[error("cylinder {code} already sold")]
    AlreadyActive {
        /// The colliding cylinder.
        code: String,
        /// Codes of the same batch sold before the collision.
        committed: Vec<String>,
    },

    /// The cylinder has no active sale.
    #[error("cylinder {code} is not currently sold")]
    NotActive {
        /// The cylinder.
        code: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
