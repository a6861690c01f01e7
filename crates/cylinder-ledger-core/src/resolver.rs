//! Latest-event-wins resolution of cylinder state.
//!
//! A cylinder is active when its latest event is a `SELL`. Everything the
//! ledger answers about active cylinders (codes per gas, holders, counts,
//! person search) is a filter over that one resolution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cylinder::{CylinderCode, CylinderKey};
use crate::event::{Attribution, EventSeq, LedgerEvent};
use crate::gas::GasType;

/// Narrows an active-cylinder query.
///
/// `gas` and `code` select which cylinders are resolved. `person` is applied
/// to the attribution of the resolving `SELL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilter {
    /// Only cylinders of this gas.
    pub gas: Option<GasType>,
    /// Only cylinders with this code.
    pub code: Option<CylinderCode>,
    /// Lower-cased substring of the customer name or national ID.
    pub person: Option<String>,
}

impl ActiveFilter {
    /// Every active cylinder.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Active cylinders of one gas.
    #[must_use]
    pub fn for_gas(gas: GasType) -> Self {
        Self {
            gas: Some(gas),
            ..Self::default()
        }
    }

    /// One specific cylinder.
    #[must_use]
    pub fn for_cylinder(gas: GasType, code: CylinderCode) -> Self {
        Self {
            gas: Some(gas),
            code: Some(code),
            person: None,
        }
    }

    /// Further restrict to cylinders held by a matching person.
    #[must_use]
    pub fn with_person(mut self, query: &str) -> Self {
        self.person = Some(query.trim().to_lowercase());
        self
    }

    /// Whether a cylinder is in scope of this filter.
    #[must_use]
    pub fn admits_key(&self, gas: &GasType, code: &CylinderCode) -> bool {
        self.gas.as_ref().map_or(true, |g| g == gas)
            && self.code.as_ref().map_or(true, |c| c == code)
    }

    /// Whether a resolving `SELL` passes the person filter.
    #[must_use]
    pub fn admits_holder(&self, attribution: &Attribution) -> bool {
        self.person
            .as_deref()
            .map_or(true, |needle| attribution.matches_person(needle))
    }
}

/// A cylinder currently out with a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCylinder {
    /// Gas type.
    pub gas: GasType,

    /// Cylinder code.
    pub cylinder_code: CylinderCode,

    /// Holder, from the `SELL` that activated the cylinder.
    #[serde(flatten)]
    pub attribution: Attribution,

    /// When the activating sale was recorded.
    pub sold_at: DateTime<Utc>,

    /// Sequence id of the activating sale.
    pub sale_seq: EventSeq,
}

impl ActiveCylinder {
    /// The cylinder identity.
    #[must_use]
    pub fn key(&self) -> CylinderKey {
        CylinderKey::new(self.gas.clone(), self.cylinder_code.clone())
    }
}

impl From<&LedgerEvent> for ActiveCylinder {
    fn from(sale: &LedgerEvent) -> Self {
        Self {
            gas: sale.gas.clone(),
            cylinder_code: sale.cylinder_code.clone(),
            attribution: sale.attribution.clone(),
            sold_at: sale.timestamp,
            sale_seq: sale.seq,
        }
    }
}

/// The latest event of every cylinder that appears in `events`.
pub fn latest_events<'a, I>(events: I) -> BTreeMap<CylinderKey, &'a LedgerEvent>
where
    I: IntoIterator<Item = &'a LedgerEvent>,
{
    events.into_iter().fold(BTreeMap::new(), |mut latest, event| {
        latest
            .entry(event.key())
            .and_modify(|current| {
                if event.supersedes(*current) {
                    *current = event;
                }
            })
            .or_insert(event);
        latest
    })
}

/// Active cylinders among `events`, ordered by gas then code.
pub fn active_cylinders<'a, I>(events: I, filter: &ActiveFilter) -> Vec<ActiveCylinder>
where
    I: IntoIterator<Item = &'a LedgerEvent>,
{
    latest_events(
        events
            .into_iter()
            .filter(|e| filter.admits_key(&e.gas, &e.cylinder_code)),
    )
    .into_values()
    .filter(|latest| latest.is_sell() && filter.admits_holder(&latest.attribution))
    .map(ActiveCylinder::from)
    .collect()
}

/// Active cylinder count per gas. Gases with none are absent.
#[must_use]
pub fn count_by_gas(active: &[ActiveCylinder]) -> BTreeMap<GasType, usize> {
    active.iter().fold(BTreeMap::new(), |mut counts, cylinder| {
        *counts.entry(cylinder.gas.clone()).or_insert(0) += 1;
        counts
    })
}
