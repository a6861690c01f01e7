//! Counts, customer listing, search and history integration tests.

mod common;

use common::{test_config, TestHarness};
use cylinder_ledger_core::GasCatalog;
use serde_json::Value;

// ============================================================================
// Counts
// ============================================================================

#[tokio::test]
async fn counts_are_zero_filled_for_every_gas() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1-3", "Asha").await;
    harness.sell("Helium", "1", "Bilal").await;
    harness.return_cylinder("Oxygen", "OXYGEN0002").await;

    let response = harness.server.get("/v1/counts").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let counts = body["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 15);
    assert_eq!(counts[0]["gas"], "Oxygen");
    assert_eq!(counts[0]["active"], 2);
    assert_eq!(counts[1]["gas"], "M Oxygen");
    assert_eq!(counts[1]["active"], 0);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn counts_match_active_lists() {
    let harness = TestHarness::new();
    harness.sell("Argon", "1-4", "Asha").await;
    harness.sell("Acetylene", "10,12", "Bilal").await;
    harness.return_cylinder("Argon", "ARGON0003").await;

    let body: Value = harness.server.get("/v1/counts").await.json();
    for entry in body["counts"].as_array().unwrap() {
        let gas = entry["gas"].as_str().unwrap();
        let codes = harness.active_codes(gas).await;
        assert_eq!(entry["active"], codes.len(), "{gas}");
    }
}

#[tokio::test]
async fn configured_catalog_replaces_default() {
    let mut config = test_config();
    config.gas_catalog = GasCatalog::new(["Nitrogen", "Oxygen"]);
    let harness = TestHarness::with_config(config);

    let body: Value = harness.server.get("/v1/counts").await.json();
    assert_eq!(body["counts"].as_array().unwrap().len(), 2);

    harness.sell("Nitrogen", "1", "Asha").await;
    assert_eq!(harness.active_codes("Nitrogen").await, vec!["NITROGEN0001"]);

    harness
        .server
        .get("/v1/active")
        .add_query_param("gas", "Argon")
        .await
        .assert_status_bad_request();
}

// ============================================================================
// Active customers
// ============================================================================

#[tokio::test]
async fn active_customers_sorted_by_name() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "5", "Zara").await;
    harness.sell("Oxygen", "1-2", "Asha").await;
    harness.return_cylinder("Oxygen", "OXYGEN0001").await;

    let response = harness
        .server
        .get("/v1/active-customers")
        .add_query_param("gas", "Oxygen")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let customers = body["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["customer_name"], "Asha");
    assert_eq!(customers[0]["cylinder_code"], "OXYGEN0002");
    assert_eq!(customers[0]["phone"], "98450 11111");
    assert_eq!(customers[1]["customer_name"], "Zara");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn search_finds_active_holders_and_events() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1", "Ravi Kumar").await;
    harness.sell("Argon", "1", "Priya").await;
    harness.return_cylinder("Oxygen", "OXYGEN0001").await;
    harness.sell("Helium", "2", "Ravi Kumar").await;

    let response = harness
        .server
        .get("/v1/search")
        .add_query_param("q", "ravi")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();

    let active = body["active"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["cylinder_code"], "HELIUM0002");

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["cylinder_code"], "HELIUM0002");
}

#[tokio::test]
async fn search_by_national_id() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1", "Asha").await;

    let body: Value = harness
        .server
        .get("/v1/search")
        .add_query_param("q", "6677")
        .await
        .json();

    assert_eq!(body["active"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_search_is_rejected() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/search").await;

    response.assert_status_bad_request();
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn history_is_newest_first_and_limited() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1-3", "Asha").await;
    harness.return_cylinder("Oxygen", "OXYGEN0001").await;

    let body: Value = harness.server.get("/v1/history").await.json();
    assert_eq!(body["count"], 4);
    assert_eq!(body["events"][0]["action"], "RETURN");
    assert_eq!(body["events"][0]["seq"], 4);

    let limited: Value = harness
        .server
        .get("/v1/history")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(limited["count"], 2);
}

#[tokio::test]
async fn history_without_limit_returns_whole_ledger() {
    // test_config caps search at 20 events; the dump must not be capped.
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1-25", "Asha").await;
    harness.sell("Helium", "1-10", "Bilal").await;

    let body: Value = harness.server.get("/v1/history").await.json();
    assert_eq!(body["count"], 35);
    assert_eq!(body["events"].as_array().unwrap().len(), 35);
    assert_eq!(body["events"][34]["cylinder_code"], "OXYGEN0001");
}

#[tokio::test]
async fn history_filters_by_period() {
    let harness = TestHarness::new();
    harness.sell("Oxygen", "1", "Asha").await;

    let body: Value = harness
        .server
        .get("/v1/history")
        .add_query_param("year", "1999")
        .await
        .json();
    assert_eq!(body["count"], 0);

    let this_month = chrono::Utc::now().format("%Y-%m").to_string();
    let body: Value = harness
        .server
        .get("/v1/history")
        .add_query_param("year", "1999")
        .add_query_param("month", &this_month)
        .await
        .json();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn history_rejects_malformed_period() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/history")
        .add_query_param("month", "2024-13")
        .await
        .assert_status_bad_request();
}
