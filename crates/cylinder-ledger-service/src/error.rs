//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cylinder_ledger_core::{CylinderCode, LedgerError};
use cylinder_ledger_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input was rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    /// A sale hit a cylinder that is already out with a customer.
    #[error("cylinder {code} already sold")]
    AlreadyActive {
        /// Gas of the colliding cylinder.
        gas: String,
        /// The colliding cylinder.
        code: String,
        /// Codes of the same batch committed before the collision.
        committed: Vec<String>,
    },

    /// The cylinder has no active sale.
    #[error("cylinder {code} is not currently sold")]
    NotActive {
        /// Gas of the cylinder.
        gas: String,
        /// The cylinder.
        code: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            Self::AlreadyActive {
                gas,
                code,
                committed,
            } => (
                StatusCode::CONFLICT,
                "already_active",
                self.to_string(),
                Some(serde_json::json!({
                    "gas": gas,
                    "code": code,
                    "committed": committed
                })),
            ),
            Self::NotActive { gas, code } => (
                StatusCode::NOT_FOUND,
                "not_active",
                self.to_string(),
                Some(serde_json::json!({
                    "gas": gas,
                    "code": code
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(e) => e.into(),
            StoreError::AlreadyActive {
                gas,
                code,
                committed,
            } => Self::AlreadyActive {
                gas: gas.to_string(),
                code: code.to_string(),
                committed: committed.iter().map(CylinderCode::to_string).collect(),
            },
            StoreError::NotActive { gas, code } => Self::NotActive {
                gas: gas.to_string(),
                code: code.to_string(),
            },
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
