//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use cylinder_ledger_core::{
    ActiveCylinder, ActiveFilter, Attribution, CylinderKey, EventSeq, HistoryQuery, LedgerEvent,
    NewEvent,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::locks::KeyLocks;
use crate::schema::{all_column_families, cf};
use crate::{newest_first, stamp_after, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    locks: KeyLocks,
    next_seq: AtomicU64,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// The next sequence id continues from the last stored event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self {
            db: Arc::new(db),
            locks: KeyLocks::default(),
            next_seq: AtomicU64::new(EventSeq::FIRST.value()),
        };

        let next = store.last_seq()?.map_or(EventSeq::FIRST, EventSeq::next);
        store.next_seq.store(next.value(), Ordering::SeqCst);

        tracing::debug!(
            path = %path.as_ref().display(),
            next_seq = %next,
            "Opened ledger store"
        );

        Ok(store)
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Sequence id of the last stored event.
    fn last_seq(&self) -> Result<Option<EventSeq>> {
        let cf = self.cf(cf::EVENTS)?;
        match self.db.iterator_cf(&cf, IteratorMode::End).next() {
            None => Ok(None),
            Some(item) => {
                let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                keys::decode_seq(&key)
                    .map(Some)
                    .ok_or_else(|| StoreError::Serialization("malformed event key".into()))
            }
        }
    }

    /// Resolve a latest-index value to its event.
    fn event_for_index_value(&self, value: &[u8]) -> Result<LedgerEvent> {
        let seq = keys::decode_seq(value)
            .ok_or_else(|| StoreError::Serialization("malformed latest-index value".into()))?;
        self.get_event(seq)?
            .ok_or_else(|| StoreError::Database(format!("latest index points at missing event {seq}")))
    }

    /// Write an event and point the cylinder's index entry at it.
    fn append(&self, event: NewEvent) -> Result<LedgerEvent> {
        let cf_events = self.cf(cf::EVENTS)?;
        let cf_latest = self.cf(cf::LATEST)?;

        let seq = EventSeq::new(self.next_seq.fetch_add(1, Ordering::SeqCst));
        let event = event.into_event(seq);

        let event_key = keys::event_key(seq);
        let index_key = keys::cylinder_key(&event.key());
        let value = Self::serialize(&event)?;

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_events, event_key, &value);
        batch.put_cf(&cf_latest, &index_key, event_key);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(event)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Mutations
    // =========================================================================

    fn record_sale(
        &self,
        cylinder: &CylinderKey,
        attribution: &Attribution,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        let _guard = self.locks.lock(cylinder);

        let previous = self.latest_event(cylinder)?;
        if previous.as_ref().is_some_and(LedgerEvent::is_sell) {
            return Err(StoreError::AlreadyActive {
                gas: cylinder.gas.clone(),
                code: cylinder.code.clone(),
                committed: Vec::new(),
            });
        }

        self.append(NewEvent::sell(
            cylinder.gas.clone(),
            cylinder.code.clone(),
            attribution.clone(),
            stamp_after(previous.as_ref(), at),
        ))
    }

    fn record_return(&self, cylinder: &CylinderKey, at: DateTime<Utc>) -> Result<LedgerEvent> {
        let _guard = self.locks.lock(cylinder);

        let sale = self
            .latest_event(cylinder)?
            .filter(LedgerEvent::is_sell)
            .ok_or_else(|| StoreError::NotActive {
                gas: cylinder.gas.clone(),
                code: cylinder.code.clone(),
            })?;

        self.append(NewEvent::return_of(&sale, stamp_after(Some(&sale), at)))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn latest_event(&self, cylinder: &CylinderKey) -> Result<Option<LedgerEvent>> {
        let cf = self.cf(cf::LATEST)?;
        let key = keys::cylinder_key(cylinder);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|value| self.event_for_index_value(&value))
            .transpose()
    }

    fn get_event(&self, seq: EventSeq) -> Result<Option<LedgerEvent>> {
        let cf = self.cf(cf::EVENTS)?;

        self.db
            .get_cf(&cf, keys::event_key(seq))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn active_cylinders(&self, filter: &ActiveFilter) -> Result<Vec<ActiveCylinder>> {
        // Single cylinder: point lookup
        if let (Some(gas), Some(code)) = (&filter.gas, &filter.code) {
            let cylinder = CylinderKey::new(gas.clone(), code.clone());
            return Ok(self
                .latest_event(&cylinder)?
                .filter(|latest| latest.is_sell() && filter.admits_holder(&latest.attribution))
                .map(|sale| vec![ActiveCylinder::from(&sale)])
                .unwrap_or_default());
        }

        let cf = self.cf(cf::LATEST)?;
        let prefix = filter.gas.as_ref().map(keys::gas_prefix).unwrap_or_default();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut active = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }

            let latest = self.event_for_index_value(&value)?;
            if latest.is_sell()
                && filter.admits_key(&latest.gas, &latest.cylinder_code)
                && filter.admits_holder(&latest.attribution)
            {
                active.push(ActiveCylinder::from(&latest));
            }
        }

        // Index keys sort by raw gas bytes; keep the trait's (gas, code) order.
        active.sort_by_key(ActiveCylinder::key);
        Ok(active)
    }

    fn list_events(&self, query: &HistoryQuery) -> Result<Vec<LedgerEvent>> {
        let cf = self.cf(cf::EVENTS)?;

        let mut matching = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let event: LedgerEvent = Self::deserialize(&value)?;
            if query.admits(&event) {
                matching.push(event);
            }
        }

        Ok(newest_first(matching, query))
    }

    fn event_count(&self) -> Result<u64> {
        let cf = self.cf(cf::EVENTS)?;

        let mut count = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Database(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("next_seq", &self.next_seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
