//! Common test utilities for cylinder ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cylinder_ledger_service::{create_router, AppState, ServiceConfig};
use cylinder_ledger_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness over a fresh in-memory ledger.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self::build(Arc::new(MemoryStore::new()), config, temp_dir)
    }

    /// Create a harness over a `RocksDB` store in a temporary directory.
    #[cfg(feature = "rocksdb-backend")]
    pub fn with_rocks() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = cylinder_ledger_store::RocksStore::open(temp_dir.path())
            .expect("Failed to open store");

        let mut config = test_config();
        config.data_dir = temp_dir.path().to_string_lossy().to_string();

        Self::build(Arc::new(store), config, temp_dir)
    }

    fn build(store: Arc<dyn Store>, config: ServiceConfig, temp_dir: TempDir) -> Self {
        let state = AppState::new(store, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
        }
    }

    /// Sell cylinders, asserting success. Returns the response body.
    pub async fn sell(&self, gas: &str, numbers: &str, customer: &str) -> Value {
        let response = self
            .server
            .post("/v1/sell")
            .json(&json!({
                "gas": gas,
                "numbers": numbers,
                "customer_name": customer,
                "phone": "98450 11111",
                "national_id": "4455-6677-8899"
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Return a cylinder, asserting success. Returns the response body.
    pub async fn return_cylinder(&self, gas: &str, code: &str) -> Value {
        let response = self
            .server
            .post("/v1/return")
            .json(&json!({ "gas": gas, "cylinder_code": code }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Active codes of a gas.
    pub async fn active_codes(&self, gas: &str) -> Vec<String> {
        let response = self
            .server
            .get("/v1/active")
            .add_query_param("gas", gas)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["codes"]
            .as_array()
            .expect("codes array")
            .iter()
            .map(|c| c.as_str().expect("code string").to_string())
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration used by the harness.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        max_batch_cylinders: 50,
        history_limit: 20,
        ..ServiceConfig::default()
    }
}
