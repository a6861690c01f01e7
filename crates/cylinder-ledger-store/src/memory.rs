//! In-memory storage implementation.
//!
//! This module provides the `MemoryStore` implementation of the `Store` trait.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use cylinder_ledger_core::{
    ActiveCylinder, ActiveFilter, Attribution, CylinderKey, EventSeq,
    HistoryQuery, LedgerEvent, NewEvent,
};

use crate::error::{Result, StoreError};
use crate::{newest_first, stamp_after, Store};

/// In-memory ledger store.
///
/// Intended for tests and for running without a database. The event log and
/// the latest-event index live behind one `RwLock`; sales and returns hold the
/// write lock across their check and append.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Event log. `events[i]` has sequence id `i + 1`.
    events: Vec<LedgerEvent>,
    /// Latest event per cylinder, as an index into `events`.
    latest: BTreeMap<CylinderKey, usize>,
}

impl Inner {
    fn latest(&self, cylinder: &CylinderKey) -> Option<&LedgerEvent> {
        self.latest.get(cylinder).map(|&i| &self.events[i])
    }

    fn append(&mut self, event: NewEvent) -> LedgerEvent {
        let seq = EventSeq::new(self.events.len() as u64 + 1);
        let event = event.into_event(seq);
        let index = self.events.len();
        self.events.push(event.clone());
        self.latest.insert(event.key(), index);
        event
    }
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// A copy of the full event log in sequence order.
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<LedgerEvent> {
        self.read().events.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index_of(seq: EventSeq) -> usize {
    (seq.value() - 1) as usize
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn record_sale(
        &self,
        cylinder: &CylinderKey,
        attribution: &Attribution,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        let mut inner = self.write();

        let previous = inner.latest(cylinder);
        if previous.is_some_and(LedgerEvent::is_sell) {
            return Err(StoreError::AlreadyActive {
                gas: cylinder.gas.clone(),
                code: cylinder.code.clone(),
                committed: Vec::new(),
            });
        }

        let sale = NewEvent::sell(
            cylinder.gas.clone(),
            cylinder.code.clone(),
            attribution.clone(),
            stamp_after(previous, at),
        );
        Ok(inner.append(sale))
    }

    fn record_return(&self, cylinder: &CylinderKey, at: DateTime<Utc>) -> Result<LedgerEvent> {
        let mut inner = self.write();

        let sale = inner
            .latest(cylinder)
            .filter(|latest| latest.is_sell())
            .ok_or_else(|| StoreError::NotActive {
                gas: cylinder.gas.clone(),
                code: cylinder.code.clone(),
            })?;

        let ret = NewEvent::return_of(sale, stamp_after(Some(sale), at));
        Ok(inner.append(ret))
    }

    fn latest_event(&self, cylinder: &CylinderKey) -> Result<Option<LedgerEvent>> {
        Ok(self.read().latest(cylinder).cloned())
    }

    fn get_event(&self, seq: EventSeq) -> Result<Option<LedgerEvent>> {
        if seq.value() == 0 {
            return Ok(None);
        }
        Ok(self.read().events.get(index_of(seq)).cloned())
    }

    fn active_cylinders(&self, filter: &ActiveFilter) -> Result<Vec<ActiveCylinder>> {
        let inner = self.read();

        Ok(inner
            .latest
            .iter()
            .filter(|(key, _)| filter.admits_key(&key.gas, &key.code))
            .map(|(_, &i)| &inner.events[i])
            .filter(|latest| latest.is_sell() && filter.admits_holder(&latest.attribution))
            .map(ActiveCylinder::from)
            .collect())
    }

    fn list_events(&self, query: &HistoryQuery) -> Result<Vec<LedgerEvent>> {
        let matching = self
            .read()
            .events
            .iter()
            .filter(|event| query.admits(event))
            .cloned()
            .collect();

        Ok(newest_first(matching, query))
    }

    fn event_count(&self) -> Result<u64> {
        Ok(self.read().events.len() as u64)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("MemoryStore")
            .field("event_count", &inner.events.len())
            .field("cylinder_count", &inner.latest.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use cylinder_ledger_core::{active_cylinders, Action, CylinderCode, GasType};
    use std::sync::Arc;

    fn cylinder(gas: &str, serial: u32) -> CylinderKey {
        let gas = GasType::new(gas);
        CylinderKey::new(gas.clone(), CylinderCode::for_serial(&gas, serial))
    }

    fn customer(name: &str) -> Attribution {
        Attribution::new(name, Some("98450 00000"), Some(&format!("{name}-ID"))).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn sale_makes_cylinder_active() {
        let store = MemoryStore::new();
        let oxygen1 = cylinder("Oxygen", 1);

        let sale = store.record_sale(&oxygen1, &customer("Asha"), at(0)).unwrap();
        assert_eq!(sale.seq, EventSeq::FIRST);
        assert_eq!(sale.action, Action::Sell);

        let active = store.active_cylinders(&ActiveFilter::all()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].attribution.customer_name, "Asha");
    }

    #[test]
    fn double_sale_is_rejected() {
        let store = MemoryStore::new();
        let oxygen1 = cylinder("Oxygen", 1);

        store.record_sale(&oxygen1, &customer("Asha"), at(0)).unwrap();
        let result = store.record_sale(&oxygen1, &customer("Bilal"), at(1));

        assert!(matches!(result, Err(StoreError::AlreadyActive { .. })));
        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[test]
    fn return_copies_sale_attribution() {
        let store = MemoryStore::new();
        let oxygen1 = cylinder("Oxygen", 1);

        store.record_sale(&oxygen1, &customer("Asha"), at(0)).unwrap();
        let ret = store.record_return(&oxygen1, at(10)).unwrap();

        assert_eq!(ret.action, Action::Return);
        assert_eq!(ret.attribution, customer("Asha"));
        assert!(store.active_cylinders(&ActiveFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn return_without_sale_is_rejected() {
        let store = MemoryStore::new();
        let oxygen1 = cylinder("Oxygen", 1);

        assert!(matches!(
            store.record_return(&oxygen1, at(0)),
            Err(StoreError::NotActive { .. })
        ));

        store.record_sale(&oxygen1, &customer("Asha"), at(0)).unwrap();
        store.record_return(&oxygen1, at(1)).unwrap();
        assert!(matches!(
            store.record_return(&oxygen1, at(2)),
            Err(StoreError::NotActive { .. })
        ));
        assert_eq!(store.event_count().unwrap(), 2);
    }

    #[test]
    fn return_with_stale_clock_still_closes_sale() {
        let store = MemoryStore::new();
        let oxygen1 = cylinder("Oxygen", 1);

        store.record_sale(&oxygen1, &customer("Asha"), at(100)).unwrap();
        let ret = store.record_return(&oxygen1, at(50)).unwrap();

        assert_eq!(ret.timestamp, at(100));
        assert!(store.active_cylinders(&ActiveFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn list_events_newest_first_with_limit() {
        let store = MemoryStore::new();
        store.record_sale(&cylinder("Oxygen", 1), &customer("Asha"), at(0)).unwrap();
        store.record_sale(&cylinder("Argon", 1), &customer("Bilal"), at(5)).unwrap();
        store.record_sale(&cylinder("Argon", 2), &customer("Bilal"), at(5)).unwrap();

        let events = store.list_events(&HistoryQuery::all()).unwrap();
        let seqs: Vec<u64> = events.iter().map(|e| e.seq.value()).collect();
        assert_eq!(seqs, vec![3, 2, 1]);

        let limited = store.list_events(&HistoryQuery::all().limit(1)).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].seq.value(), 3);
    }

    #[test]
    fn get_event_by_seq() {
        let store = MemoryStore::new();
        store.record_sale(&cylinder("Oxygen", 1), &customer("Asha"), at(0)).unwrap();

        assert!(store.get_event(EventSeq::FIRST).unwrap().is_some());
        assert!(store.get_event(EventSeq::new(0)).unwrap().is_none());
        assert!(store.get_event(EventSeq::new(2)).unwrap().is_none());
    }

    #[test]
    fn index_agrees_with_full_resolution() {
        let store = MemoryStore::new();
        for serial in 1..=6 {
            let key = cylinder("Oxygen", serial);
            store.record_sale(&key, &customer("Asha"), at(0)).unwrap();
            if serial % 2 == 0 {
                store.record_return(&key, at(1)).unwrap();
            }
            if serial % 3 == 0 {
                let _ = store.record_sale(&key, &customer("Bilal"), at(2));
            }
        }

        let indexed = store.active_cylinders(&ActiveFilter::all()).unwrap();
        let resolved = active_cylinders(&store.snapshot(), &ActiveFilter::all());
        assert_eq!(indexed, resolved);
    }

    #[test]
    fn concurrent_sales_of_one_cylinder_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let key = cylinder("Oxygen", 9);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                let key = key.clone();
                std::thread::spawn(move || {
                    store
                        .record_sale(&key, &customer(&format!("C{i}")), at(0) + Duration::seconds(i))
                        .is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(store.event_count().unwrap(), 1);
    }
}
