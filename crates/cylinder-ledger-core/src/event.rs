//! Ledger events.
//!
//! The ledger is an append-only sequence of [`LedgerEvent`]s. Events are never
//! updated or deleted; every state question is answered by resolving the
//! events recorded against a cylinder.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cylinder::{CylinderCode, CylinderKey};
use crate::error::{LedgerError, Result};
use crate::gas::GasType;

/// Sequence id assigned to an event by the store at insert time.
///
/// Strictly increasing in insertion order. Used only to order events that
/// share a timestamp, never as a business key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSeq(u64);

impl EventSeq {
    /// The first sequence id handed out by an empty ledger.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw sequence number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The sequence id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Big-endian bytes, which sort in sequence order.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Rebuild a sequence id from big-endian bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Debug for EventSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventSeq({})", self.0)
    }
}

impl fmt::Display for EventSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to the cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Cylinder handed out to a customer.
    Sell,
    /// Cylinder brought back by the customer.
    Return,
}

impl Action {
    /// The action name as stored in the ledger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sell => "SELL",
            Self::Return => "RETURN",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer identity attached to an event.
///
/// A `SELL` carries the identity captured at the counter. A `RETURN` carries a
/// copy of the identity from the `SELL` it closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Customer name.
    pub customer_name: String,

    /// Phone number, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// National ID number, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

impl Attribution {
    /// Build an attribution from form input.
    ///
    /// Values are trimmed and blank optional fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` if the customer name is blank.
    pub fn new(
        customer_name: &str,
        phone: Option<&str>,
        national_id: Option<&str>,
    ) -> Result<Self> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(LedgerError::MissingField("customer_name"));
        }
        Ok(Self {
            customer_name: customer_name.to_string(),
            phone: non_blank(phone),
            national_id: non_blank(national_id),
        })
    }

    /// Whether the customer name or national ID contains `needle`, ignoring
    /// case. `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_person(&self, needle: &str) -> bool {
        self.customer_name.to_lowercase().contains(needle)
            || self
                .national_id
                .as_deref()
                .is_some_and(|id| id.to_lowercase().contains(needle))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// An event waiting to be appended. The store assigns its sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Gas type.
    pub gas: GasType,
    /// Cylinder code.
    pub cylinder_code: CylinderCode,
    /// Sell or return.
    pub action: Action,
    /// Customer identity.
    pub attribution: Attribution,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
}

impl NewEvent {
    /// A `SELL` of one cylinder.
    #[must_use]
    pub fn sell(
        gas: GasType,
        cylinder_code: CylinderCode,
        attribution: Attribution,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            gas,
            cylinder_code,
            action: Action::Sell,
            attribution,
            timestamp,
        }
    }

    /// The `RETURN` closing an active sale. Identity is copied from the sale.
    #[must_use]
    pub fn return_of(sale: &LedgerEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            gas: sale.gas.clone(),
            cylinder_code: sale.cylinder_code.clone(),
            action: Action::Return,
            attribution: sale.attribution.clone(),
            timestamp,
        }
    }

    /// Stamp the event with its sequence id.
    #[must_use]
    pub fn into_event(self, seq: EventSeq) -> LedgerEvent {
        LedgerEvent {
            seq,
            gas: self.gas,
            cylinder_code: self.cylinder_code,
            action: self.action,
            attribution: self.attribution,
            timestamp: self.timestamp,
        }
    }
}

/// A committed ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Sequence id assigned at insert.
    pub seq: EventSeq,

    /// Gas type.
    pub gas: GasType,

    /// Cylinder code.
    pub cylinder_code: CylinderCode,

    /// Sell or return.
    pub action: Action,

    /// Customer identity.
    #[serde(flatten)]
    pub attribution: Attribution,

    /// Capture time.
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent {
    /// The cylinder this event belongs to.
    #[must_use]
    pub fn key(&self) -> CylinderKey {
        CylinderKey::new(self.gas.clone(), self.cylinder_code.clone())
    }

    /// Whether this is a `SELL`.
    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.action == Action::Sell
    }

    /// Ledger order: timestamp first, sequence id on ties.
    #[must_use]
    pub fn ledger_order(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.seq.cmp(&other.seq))
    }

    /// Whether this event replaces `other` as the latest event of a cylinder.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        self.ledger_order(other) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(seq: u64, secs: i64, action: Action) -> LedgerEvent {
        let gas = GasType::new("Oxygen");
        LedgerEvent {
            seq: EventSeq::new(seq),
            cylinder_code: CylinderCode::for_serial(&gas, 1),
            gas,
            action,
            attribution: Attribution::new("Asha", None, None).unwrap(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn later_timestamp_wins_over_higher_seq() {
        let early = event(9, 100, Action::Sell);
        let late = event(2, 200, Action::Return);
        assert!(late.supersedes(&early));
        assert!(!early.supersedes(&late));
    }

    #[test]
    fn same_timestamp_breaks_tie_on_seq() {
        let first = event(1, 100, Action::Sell);
        let second = event(2, 100, Action::Return);
        assert!(second.supersedes(&first));
        assert!(!first.supersedes(&second));
        assert!(!first.supersedes(&first));
    }

    #[test]
    fn attribution_trims_and_drops_blanks() {
        let attribution = Attribution::new("  Ravi Kumar ", Some("  "), Some(" 1234 ")).unwrap();
        assert_eq!(attribution.customer_name, "Ravi Kumar");
        assert_eq!(attribution.phone, None);
        assert_eq!(attribution.national_id.as_deref(), Some("1234"));
    }

    #[test]
    fn attribution_requires_name() {
        assert_eq!(
            Attribution::new(" ", None, None),
            Err(LedgerError::MissingField("customer_name"))
        );
    }

    #[test]
    fn person_match_covers_name_and_national_id() {
        let attribution = Attribution::new("Ravi Kumar", None, Some("AB-9981")).unwrap();
        assert!(attribution.matches_person("kumar"));
        assert!(attribution.matches_person("ab-99"));
        assert!(!attribution.matches_person("singh"));
    }

    #[test]
    fn return_copies_sale_identity() {
        let sale = event(1, 100, Action::Sell);
        let ret = NewEvent::return_of(&sale, Utc.timestamp_opt(150, 0).unwrap());
        assert_eq!(ret.action, Action::Return);
        assert_eq!(ret.attribution, sale.attribution);
        assert_eq!(ret.cylinder_code, sale.cylinder_code);
    }

    #[test]
    fn event_json_shape() {
        let json = serde_json::to_value(event(3, 0, Action::Sell)).unwrap();
        assert_eq!(json["seq"], 3);
        assert_eq!(json["action"], "SELL");
        assert_eq!(json["customer_name"], "Asha");
        assert_eq!(json["cylinder_code"], "OXYGEN0001");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn seq_bytes_sort_in_order() {
        assert!(EventSeq::new(255).to_bytes() < EventSeq::new(256).to_bytes());
        assert_eq!(EventSeq::from_bytes(EventSeq::new(42).to_bytes()).value(), 42);
    }
}
