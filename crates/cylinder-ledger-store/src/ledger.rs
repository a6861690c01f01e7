//! The ledger engine.
//!
//! [`Ledger`] validates input against the gas catalog, turns number-set
//! specifications into sell batches, and answers the active-cylinder queries.
//! All state lives in the [`Store`]; the engine itself holds only
//! configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use cylinder_ledger_core::{
    count_by_gas, ActiveCylinder, ActiveFilter, Attribution, CylinderCode, CylinderKey,
    DateFilter, GasCatalog, GasType, HistoryQuery, LedgerError, LedgerEvent, NumberSet,
};

use crate::error::{Result, StoreError};
use crate::Store;

/// A request to sell a batch of cylinders to one customer.
#[derive(Debug, Clone, Copy)]
pub struct SellOrder<'a> {
    /// Gas type name.
    pub gas: &'a str,
    /// Number-set specification, e.g. `"1,3,5-7"`.
    pub numbers: &'a str,
    /// Customer name (required).
    pub customer_name: &'a str,
    /// Phone number.
    pub phone: Option<&'a str>,
    /// National ID number.
    pub national_id: Option<&'a str>,
}

/// Outcome of a fully successful sell batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellReceipt {
    /// Gas type of the batch.
    pub gas: GasType,
    /// The `SELL` events written, in processing order.
    pub sold: Vec<LedgerEvent>,
    /// Number tokens skipped as malformed.
    pub skipped: Vec<String>,
}

/// The ledger engine.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
    catalog: GasCatalog,
    max_batch_cylinders: usize,
}

impl Ledger {
    /// Create an engine over a store.
    ///
    /// `max_batch_cylinders` caps how many cylinders one sell order may name.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, catalog: GasCatalog, max_batch_cylinders: usize) -> Self {
        Self {
            store,
            catalog,
            max_batch_cylinders,
        }
    }

    /// The gas catalog this ledger accepts.
    #[must_use]
    pub fn catalog(&self) -> &GasCatalog {
        &self.catalog
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Sell a batch of cylinders.
    ///
    /// All cylinders of the batch share one timestamp and are sold in the
    /// order the number list names them. The batch stops at the first
    /// cylinder that is already out. Cylinders sold before that point stay
    /// sold; later ones are not attempted.
    ///
    /// # Errors
    ///
    /// - `StoreError::Invalid` for missing fields, an unknown gas, or a number
    ///   specification that is empty or too large. Nothing is written.
    /// - `StoreError::AlreadyActive` at the first collision, listing the codes
    ///   committed before it.
    /// - `StoreError::Database` / `StoreError::Serialization` on storage failure.
    pub fn sell(&self, order: &SellOrder<'_>) -> Result<SellReceipt> {
        if order.gas.trim().is_empty() {
            return Err(LedgerError::MissingField("gas").into());
        }
        if order.numbers.trim().is_empty() {
            return Err(LedgerError::MissingField("numbers").into());
        }
        let attribution = Attribution::new(order.customer_name, order.phone, order.national_id)?;
        let gas = self.catalog.resolve(order.gas)?;

        let numbers = NumberSet::parse(order.numbers, self.max_batch_cylinders)?;
        if numbers.is_empty() {
            return Err(LedgerError::EmptyNumberSet(order.numbers.trim().to_string()).into());
        }
        if !numbers.skipped().is_empty() {
            tracing::debug!(
                gas = %gas,
                skipped = ?numbers.skipped(),
                "Skipped malformed cylinder numbers"
            );
        }

        let at = Utc::now();
        let mut sold: Vec<LedgerEvent> = Vec::with_capacity(numbers.len());

        for &serial in numbers.serials() {
            let cylinder = CylinderKey::new(gas.clone(), CylinderCode::for_serial(&gas, serial));

            match self.store.record_sale(&cylinder, &attribution, at) {
                Ok(event) => sold.push(event),
                Err(StoreError::AlreadyActive { gas, code, .. }) => {
                    let committed: Vec<CylinderCode> =
                        sold.into_iter().map(|e| e.cylinder_code).collect();
                    tracing::warn!(
                        gas = %gas,
                        code = %code,
                        committed = committed.len(),
                        "Sell batch halted: cylinder already sold"
                    );
                    return Err(StoreError::AlreadyActive {
                        gas,
                        code,
                        committed,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            gas = %gas,
            customer = %attribution.customer_name,
            count = sold.len(),
            "Cylinders sold"
        );

        Ok(SellReceipt {
            gas,
            sold,
            skipped: numbers.skipped().to_vec(),
        })
    }

    /// Return an active cylinder.
    ///
    /// The `RETURN` is attributed to the customer of the sale it closes.
    ///
    /// # Errors
    ///
    /// - `StoreError::Invalid` for a blank or unknown gas or a malformed code.
    /// - `StoreError::NotActive` if the cylinder is not currently sold.
    /// - `StoreError::Database` / `StoreError::Serialization` on storage failure.
    pub fn return_cylinder(&self, gas: &str, code: &str) -> Result<LedgerEvent> {
        let cylinder = self.cylinder(gas, code)?;

        match self.store.record_return(&cylinder, Utc::now()) {
            Ok(event) => {
                tracing::info!(
                    gas = %event.gas,
                    code = %event.cylinder_code,
                    customer = %event.attribution.customer_name,
                    "Cylinder returned"
                );
                Ok(event)
            }
            Err(e @ StoreError::NotActive { .. }) => {
                tracing::warn!(gas = %cylinder.gas, code = %cylinder.code, "Invalid return");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Codes of the active cylinders of one gas, ascending.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for a blank or unknown gas, or a storage error.
    pub fn active_codes(&self, gas: &str) -> Result<Vec<CylinderCode>> {
        let gas = self.catalog.resolve(gas)?;
        Ok(self
            .store
            .active_cylinders(&ActiveFilter::for_gas(gas))?
            .into_iter()
            .map(|c| c.cylinder_code)
            .collect())
    }

    /// Whether a cylinder is currently sold.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for bad input, or a storage error.
    pub fn is_active(&self, gas: &str, code: &str) -> Result<bool> {
        let cylinder = self.cylinder(gas, code)?;
        Ok(self
            .store
            .latest_event(&cylinder)?
            .is_some_and(|latest| latest.is_sell()))
    }

    /// Who holds a cylinder.
    ///
    /// # Errors
    ///
    /// - `StoreError::Invalid` for bad input.
    /// - `StoreError::NotActive` if the cylinder is not currently sold.
    pub fn holder(&self, gas: &str, code: &str) -> Result<ActiveCylinder> {
        let cylinder = self.cylinder(gas, code)?;
        let filter = ActiveFilter::for_cylinder(cylinder.gas.clone(), cylinder.code.clone());

        self.store
            .active_cylinders(&filter)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotActive {
                gas: cylinder.gas,
                code: cylinder.code,
            })
    }

    /// Number of active cylinders per gas. Gases with none are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn counts(&self) -> Result<BTreeMap<GasType, usize>> {
        let active = self.store.active_cylinders(&ActiveFilter::all())?;
        Ok(count_by_gas(&active))
    }

    /// Active cylinders of one gas with their holders, ordered by customer
    /// name, then code.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for a blank or unknown gas, or a storage error.
    pub fn active_customers(&self, gas: &str) -> Result<Vec<ActiveCylinder>> {
        let gas = self.catalog.resolve(gas)?;
        let mut active = self.store.active_cylinders(&ActiveFilter::for_gas(gas))?;
        active.sort_by(|a, b| {
            a.attribution
                .customer_name
                .cmp(&b.attribution.customer_name)
                .then_with(|| a.cylinder_code.cmp(&b.cylinder_code))
        });
        Ok(active)
    }

    /// Active cylinders whose holder's name or national ID contains `query`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for a blank query, or a storage error.
    pub fn search_active(&self, query: &str) -> Result<Vec<ActiveCylinder>> {
        if query.trim().is_empty() {
            return Err(LedgerError::MissingField("q").into());
        }
        self.store
            .active_cylinders(&ActiveFilter::all().with_person(query))
    }

    /// Ledger events whose customer name, national ID or gas contains `query`,
    /// ignoring case, newest first.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for a blank query, or a storage error.
    pub fn search_events(&self, query: &str, limit: usize) -> Result<Vec<LedgerEvent>> {
        if query.trim().is_empty() {
            return Err(LedgerError::MissingField("q").into());
        }
        self.store
            .list_events(&HistoryQuery::all().matching(query).limit(limit))
    }

    /// The ledger, newest first, optionally restricted to a year or month.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn history(&self, date: Option<DateFilter>, limit: Option<usize>) -> Result<Vec<LedgerEvent>> {
        let query = HistoryQuery {
            date,
            text: None,
            limit,
        };
        self.store.list_events(&query)
    }

    fn cylinder(&self, gas: &str, code: &str) -> Result<CylinderKey> {
        let gas = self.catalog.resolve(gas)?;
        let code = CylinderCode::parse(code)?;
        Ok(CylinderKey::new(gas, code))
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("gases", &self.catalog.len())
            .field("max_batch_cylinders", &self.max_batch_cylinders)
            .finish_non_exhaustive()
    }
}
