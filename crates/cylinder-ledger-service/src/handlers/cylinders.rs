//! Gas catalog, sell, return and per-cylinder lookup handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use cylinder_ledger_core::{ActiveCylinder, GasType, LedgerEvent};
use cylinder_ledger_store::SellOrder;

use crate::error::ApiError;
use crate::state::AppState;

/// Gas catalog response.
#[derive(Debug, Serialize)]
pub struct GasesResponse {
    /// Gas types in catalog order.
    pub gases: Vec<GasType>,
}

/// List the configured gas types.
pub async fn list_gases(State(state): State<Arc<AppState>>) -> Json<GasesResponse> {
    Json(GasesResponse {
        gases: state.ledger.catalog().iter().cloned().collect(),
    })
}

/// Query parameters selecting a gas.
#[derive(Debug, Deserialize)]
pub struct GasQuery {
    /// Gas type name.
    #[serde(default)]
    pub gas: String,
}

/// Active codes response.
#[derive(Debug, Serialize)]
pub struct ActiveCodesResponse {
    /// Gas type.
    pub gas: String,
    /// Active cylinder codes, ascending.
    pub codes: Vec<String>,
    /// Number of active cylinders.
    pub count: usize,
}

/// List the active cylinder codes of a gas.
pub async fn active_codes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GasQuery>,
) -> Result<Json<ActiveCodesResponse>, ApiError> {
    let codes: Vec<String> = state
        .ledger
        .active_codes(&query.gas)?
        .iter()
        .map(ToString::to_string)
        .collect();

    Ok(Json(ActiveCodesResponse {
        gas: query.gas.trim().to_string(),
        count: codes.len(),
        codes,
    }))
}

/// Query parameters selecting one cylinder.
#[derive(Debug, Deserialize)]
pub struct CylinderQuery {
    /// Gas type name.
    #[serde(default)]
    pub gas: String,
    /// Cylinder code.
    #[serde(default)]
    pub code: String,
}

/// Look up who holds a cylinder.
pub async fn holder(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CylinderQuery>,
) -> Result<Json<ActiveCylinder>, ApiError> {
    let active = state.ledger.holder(&query.gas, &query.code)?;
    Ok(Json(active))
}

/// Sell request.
#[derive(Debug, Deserialize)]
pub struct SellRequest {
    /// Gas type name.
    #[serde(default)]
    pub gas: String,
    /// Number-set specification, e.g. `"1,3,5-7"`.
    #[serde(default)]
    pub numbers: String,
    /// Customer name.
    #[serde(default)]
    pub customer_name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// National ID number.
    #[serde(default)]
    pub national_id: Option<String>,
}

/// Sell response.
#[derive(Debug, Serialize)]
pub struct SellResponse {
    /// Gas type.
    pub gas: GasType,
    /// The `SELL` events written.
    pub sold: Vec<LedgerEvent>,
    /// Number tokens skipped as malformed.
    pub skipped: Vec<String>,
}

/// Sell a batch of cylinders to a customer.
///
/// Stops at the first cylinder that is already out; cylinders sold before it
/// are reported in the conflict details.
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SellRequest>,
) -> Result<Json<SellResponse>, ApiError> {
    let receipt = state.ledger.sell(&SellOrder {
        gas: &req.gas,
        numbers: &req.numbers,
        customer_name: &req.customer_name,
        phone: req.phone.as_deref(),
        national_id: req.national_id.as_deref(),
    })?;

    Ok(Json(SellResponse {
        gas: receipt.gas,
        sold: receipt.sold,
        skipped: receipt.skipped,
    }))
}

/// Return request.
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    /// Gas type name.
    #[serde(default)]
    pub gas: String,
    /// Cylinder code, e.g. `"OXYGEN0007"`. Case-insensitive.
    #[serde(default)]
    pub cylinder_code: String,
}

/// Return response.
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    /// The `RETURN` event written.
    pub returned: LedgerEvent,
}

/// Return an active cylinder.
pub async fn return_cylinder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<ReturnResponse>, ApiError> {
    let returned = state.ledger.return_cylinder(&req.gas, &req.cylinder_code)?;
    Ok(Json(ReturnResponse { returned }))
}
