//! Cylinder ledger HTTP client implementation.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use cylinder_ledger_core::{ActiveCylinder, DateFilter};

use crate::error::ClientError;
use crate::types::{
    ActiveCodesResponse, ActiveCustomersResponse, ApiErrorResponse, CountsResponse,
    GasesResponse, HealthResponse, HistoryResponse, ReturnRequest, ReturnResponse,
    SearchResponse, SellRequest, SellResponse,
};

/// Cylinder ledger API client.
///
/// One method per API route. Error bodies are mapped onto [`ClientError`]
/// variants so callers can tell a conflicting sale from a bad request.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the ledger service (e.g., `"http://localhost:4000"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new ledger client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the base URL is blank or the
    /// HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base URL is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health", &[]).await
    }

    /// List the configured gas types.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn gases(&self) -> Result<GasesResponse, ClientError> {
        self.get("/v1/gases", &[]).await
    }

    /// Active cylinder codes of a gas, ascending.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an unknown gas.
    pub async fn active_codes(&self, gas: &str) -> Result<ActiveCodesResponse, ClientError> {
        self.get("/v1/active", &[("gas", gas)]).await
    }

    /// Who holds a cylinder.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotActive` if the cylinder is not currently sold.
    pub async fn holder(&self, gas: &str, code: &str) -> Result<ActiveCylinder, ClientError> {
        self.get("/v1/holder", &[("gas", gas), ("code", code)]).await
    }

    /// Sell a batch of cylinders.
    ///
    /// # Errors
    ///
    /// - `ClientError::AlreadyActive` at the first cylinder already out. The
    ///   cylinders listed in `committed` were sold.
    /// - `ClientError::Validation` if the request was rejected before any sale.
    pub async fn sell(&self, request: &SellRequest) -> Result<SellResponse, ClientError> {
        let url = format!("{}/v1/sell", self.base_url);
        tracing::debug!(gas = %request.gas, numbers = %request.numbers, "Selling cylinders");

        let response = self.client.post(&url).json(request).send().await?;

        self.handle_response(response).await
    }

    /// Return a cylinder.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotActive` if the cylinder is not currently sold.
    pub async fn return_cylinder(
        &self,
        gas: &str,
        cylinder_code: &str,
    ) -> Result<ReturnResponse, ClientError> {
        let url = format!("{}/v1/return", self.base_url);
        tracing::debug!(gas = %gas, code = %cylinder_code, "Returning cylinder");

        let response = self
            .client
            .post(&url)
            .json(&ReturnRequest { gas, cylinder_code })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Active cylinder counts for every gas.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn counts(&self) -> Result<CountsResponse, ClientError> {
        self.get("/v1/counts", &[]).await
    }

    /// Holders of a gas's active cylinders, by customer name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an unknown gas.
    pub async fn active_customers(&self, gas: &str) -> Result<ActiveCustomersResponse, ClientError> {
        self.get("/v1/active-customers", &[("gas", gas)]).await
    }

    /// Search active holders and ledger events.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank query.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        self.get("/v1/search", &[("q", query)]).await
    }

    /// Ledger events, newest first, optionally restricted to a year or month.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn history(
        &self,
        period: Option<DateFilter>,
        limit: Option<usize>,
    ) -> Result<HistoryResponse, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        match period {
            Some(DateFilter::Year(year)) => params.push(("year", format!("{year:04}"))),
            Some(DateFilter::Month { year, month }) => {
                params.push(("month", format!("{year:04}-{month:02}")));
            }
            None => {}
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get("/v1/history", &params).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);

        let response = self.client.get(&url).query(query).send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        // Try to parse error response
        let Ok(api_error) = serde_json::from_slice::<ApiErrorResponse>(&body) else {
            return Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            });
        };

        let error = api_error.error;
        let detail = |key: &str| {
            error
                .details
                .as_ref()
                .and_then(|d| d.get(key))
                .cloned()
                .unwrap_or_default()
        };

        // Map specific error codes to typed errors
        match error.code.as_str() {
            "validation_error" => Err(ClientError::Validation(error.message)),
            "already_active" => {
                let code = detail("code").as_str().unwrap_or_default().to_string();
                let committed: Vec<String> = detail("committed")
                    .as_array()
                    .map(|codes| {
                        codes
                            .iter()
                            .filter_map(|c| c.as_str().map(ToString::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                tracing::debug!(code = %code, "Sale rejected: cylinder already sold");
                Err(ClientError::AlreadyActive { code, committed })
            }
            "not_active" => Err(ClientError::NotActive {
                code: detail("code").as_str().unwrap_or_default().to_string(),
            }),
            _ => Err(ClientError::Api {
                code: error.code.clone(),
                message: error.message.clone(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("cylinder-ledger-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientOptions {
    /// Options with a custom timeout.
    #[must_use]
    pub fn with_timeout(seconds: u64) -> Self {
        Self {
            timeout_seconds: seconds,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = LedgerClient::new("http://localhost:4000").unwrap();
        assert_eq!(client.base_url, "http://localhost:4000");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LedgerClient::new("http://localhost:4000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:4000");
    }

    #[test]
    fn blank_base_url_is_rejected() {
        assert!(matches!(
            LedgerClient::new("/"),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn client_options() {
        let options = ClientOptions::with_timeout(5);
        assert_eq!(options.timeout_seconds, 5);
        assert!(LedgerClient::with_options("http://localhost:4000", options).is_ok());
    }
}
