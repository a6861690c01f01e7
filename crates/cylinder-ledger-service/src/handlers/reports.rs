//! Aggregate counts, customer listings, search and ledger history handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use cylinder_ledger_core::{ActiveCylinder, DateFilter, GasType, LedgerError, LedgerEvent};

use crate::error::ApiError;
use crate::handlers::cylinders::GasQuery;
use crate::state::AppState;

/// Active count for one gas.
#[derive(Debug, Serialize)]
pub struct GasCount {
    /// Gas type.
    pub gas: GasType,
    /// Number of active cylinders.
    pub active: usize,
}

/// Aggregate counts response.
#[derive(Debug, Serialize)]
pub struct CountsResponse {
    /// One entry per catalog gas, in catalog order.
    pub counts: Vec<GasCount>,
    /// Active cylinders across all gases.
    pub total: usize,
}

/// Active cylinder counts for every gas in the catalog.
pub async fn counts(State(state): State<Arc<AppState>>) -> Result<Json<CountsResponse>, ApiError> {
    let active = state.ledger.counts()?;

    let counts: Vec<GasCount> = state
        .ledger
        .catalog()
        .iter()
        .map(|gas| GasCount {
            gas: gas.clone(),
            active: active.get(gas).copied().unwrap_or(0),
        })
        .collect();
    let total = counts.iter().map(|c| c.active).sum();

    Ok(Json(CountsResponse { counts, total }))
}

/// Active customers response.
#[derive(Debug, Serialize)]
pub struct ActiveCustomersResponse {
    /// Gas type.
    pub gas: String,
    /// Active cylinders with their holders, by customer name.
    pub customers: Vec<ActiveCylinder>,
}

/// Who currently holds cylinders of a gas.
pub async fn active_customers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GasQuery>,
) -> Result<Json<ActiveCustomersResponse>, ApiError> {
    let customers = state.ledger.active_customers(&query.gas)?;
    Ok(Json(ActiveCustomersResponse {
        gas: query.gas.trim().to_string(),
        customers,
    }))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring of a customer name, national ID or gas.
    #[serde(default)]
    pub q: String,
}

/// Search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// The query as given.
    pub query: String,
    /// Active cylinders held by a matching person.
    pub active: Vec<ActiveCylinder>,
    /// Matching ledger events, newest first.
    pub events: Vec<LedgerEvent>,
}

/// Search active holders and the ledger.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let active = state.ledger.search_active(&query.q)?;
    let events = state
        .ledger
        .search_events(&query.q, state.config.history_limit)?;

    Ok(Json(SearchResponse {
        query: query.q.trim().to_string(),
        active,
        events,
    }))
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Calendar year, `YYYY`.
    pub year: Option<String>,
    /// Calendar month, `YYYY-MM`. Takes precedence over `year`.
    pub month: Option<String>,
    /// Maximum number of events. Without it the whole ledger is returned.
    pub limit: Option<usize>,
}

impl HistoryParams {
    /// The date filter selected by these parameters.
    fn date_filter(&self) -> Result<Option<DateFilter>, LedgerError> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        if let Some(month) = non_blank(&self.month) {
            return match month.parse::<DateFilter>()? {
                filter @ DateFilter::Month { .. } => Ok(Some(filter)),
                DateFilter::Year(_) => Err(LedgerError::InvalidDateFilter(month)),
            };
        }
        if let Some(year) = non_blank(&self.year) {
            return match year.parse::<DateFilter>()? {
                filter @ DateFilter::Year(_) => Ok(Some(filter)),
                DateFilter::Month { .. } => Err(LedgerError::InvalidDateFilter(year)),
            };
        }
        Ok(None)
    }
}

/// History response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Events, newest first.
    pub events: Vec<LedgerEvent>,
    /// Number of events returned.
    pub count: usize,
}

/// Dump the ledger, newest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let date = params.date_filter()?;

    let events = state.ledger.history(date, params.limit)?;

    Ok(Json(HistoryResponse {
        count: events.len(),
        events,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(year: Option<&str>, month: Option<&str>) -> HistoryParams {
        HistoryParams {
            year: year.map(String::from),
            month: month.map(String::from),
            limit: None,
        }
    }

    #[test]
    fn month_takes_precedence() {
        let filter = params(Some("2023"), Some("2024-05")).date_filter().unwrap();
        assert_eq!(
            filter,
            Some(DateFilter::Month {
                year: 2024,
                month: 5
            })
        );
    }

    #[test]
    fn blank_params_mean_no_filter() {
        assert_eq!(params(Some(" "), Some("")).date_filter().unwrap(), None);
        assert_eq!(params(None, None).date_filter().unwrap(), None);
    }

    #[test]
    fn mismatched_granularity_is_rejected() {
        assert!(params(None, Some("2024")).date_filter().is_err());
        assert!(params(Some("2024-05"), None).date_filter().is_err());
    }
}
