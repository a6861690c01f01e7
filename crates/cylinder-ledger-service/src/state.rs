//! Application state.

use std::sync::Arc;

use cylinder_ledger_store::{Ledger, Store};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger engine.
    pub ledger: Ledger,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let ledger = Ledger::new(
            store,
            config.gas_catalog.clone(),
            config.max_batch_cylinders,
        );

        tracing::info!(
            gases = config.gas_catalog.len(),
            max_batch_cylinders = config.max_batch_cylinders,
            "Ledger engine ready"
        );

        Self { ledger, config }
    }
}
