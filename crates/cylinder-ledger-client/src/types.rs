//! Request and response types for the ledger client.

use serde::{Deserialize, Serialize};

use cylinder_ledger_core::{ActiveCylinder, CylinderCode, GasType, LedgerEvent};

/// Sell request.
#[derive(Debug, Clone, Serialize)]
pub struct SellRequest {
    /// Gas type name.
    pub gas: String,
    /// Number-set specification, e.g. `"1,3,5-7"`.
    pub numbers: String,
    /// Customer name.
    pub customer_name: String,
    /// Phone number (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// National ID number (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

impl SellRequest {
    /// A sale without contact details.
    #[must_use]
    pub fn new(
        gas: impl Into<String>,
        numbers: impl Into<String>,
        customer_name: impl Into<String>,
    ) -> Self {
        Self {
            gas: gas.into(),
            numbers: numbers.into(),
            customer_name: customer_name.into(),
            phone: None,
            national_id: None,
        }
    }

    /// Attach a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach a national ID number.
    #[must_use]
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }
}

/// Sell response.
#[derive(Debug, Clone, Deserialize)]
pub struct SellResponse {
    /// Gas type.
    pub gas: GasType,
    /// The `SELL` events written.
    pub sold: Vec<LedgerEvent>,
    /// Number tokens skipped as malformed.
    #[serde(default)]
    pub skipped: Vec<String>,
}

/// Return request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReturnRequest<'a> {
    pub gas: &'a str,
    pub cylinder_code: &'a str,
}

/// Return response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnResponse {
    /// The `RETURN` event written.
    pub returned: LedgerEvent,
}

/// Gas catalog response.
#[derive(Debug, Clone, Deserialize)]
pub struct GasesResponse {
    /// Gas types in catalog order.
    pub gases: Vec<GasType>,
}

/// Active codes response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveCodesResponse {
    /// Gas type.
    pub gas: String,
    /// Active cylinder codes, ascending.
    pub codes: Vec<CylinderCode>,
    /// Number of active cylinders.
    pub count: usize,
}

/// Active count for one gas.
#[derive(Debug, Clone, Deserialize)]
pub struct GasCount {
    /// Gas type.
    pub gas: GasType,
    /// Number of active cylinders.
    pub active: usize,
}

/// Aggregate counts response.
#[derive(Debug, Clone, Deserialize)]
pub struct CountsResponse {
    /// One entry per catalog gas.
    pub counts: Vec<GasCount>,
    /// Active cylinders across all gases.
    pub total: usize,
}

/// Active customers response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveCustomersResponse {
    /// Gas type.
    pub gas: String,
    /// Active cylinders with their holders.
    pub customers: Vec<ActiveCylinder>,
}

/// Search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// The query.
    pub query: String,
    /// Active cylinders held by a matching person.
    pub active: Vec<ActiveCylinder>,
    /// Matching ledger events, newest first.
    pub events: Vec<LedgerEvent>,
}

/// History response.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    /// Events, newest first.
    pub events: Vec<LedgerEvent>,
    /// Number of events returned.
    pub count: usize,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// API error response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
