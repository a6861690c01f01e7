//! Ledger dump filters.

use std::str::FromStr;

use chrono::Datelike;

use crate::error::LedgerError;
use crate::event::LedgerEvent;

/// Restricts a ledger dump to one year or one month.
///
/// Parsed from the ISO prefix of a timestamp: `"2024"` or `"2024-05"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// A calendar year.
    Year(i32),
    /// A calendar month.
    Month {
        /// Year.
        year: i32,
        /// Month, 1 to 12.
        month: u32,
    },
}

impl DateFilter {
    /// Whether an event falls inside the period (UTC).
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let ts = event.timestamp;
        match *self {
            Self::Year(year) => ts.year() == year,
            Self::Month { year, month } => ts.year() == year && ts.month() == month,
        }
    }
}

impl FromStr for DateFilter {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || LedgerError::InvalidDateFilter(s.to_string());

        let year_of = |y: &str| -> Result<i32, LedgerError> {
            if y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()) {
                y.parse().map_err(|_| invalid())
            } else {
                Err(invalid())
            }
        };

        match s.split_once('-') {
            None => Ok(Self::Year(year_of(s)?)),
            Some((y, m)) => {
                let year = year_of(y)?;
                if m.len() != 2 {
                    return Err(invalid());
                }
                let month: u32 = m.parse().map_err(|_| invalid())?;
                if (1..=12).contains(&month) {
                    Ok(Self::Month { year, month })
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// Selects events for a ledger dump or search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Only events inside this period.
    pub date: Option<DateFilter>,

    /// Lower-cased substring of the customer name, national ID or gas.
    pub text: Option<String>,

    /// Maximum number of events returned.
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a period.
    #[must_use]
    pub fn within(mut self, date: DateFilter) -> Self {
        self.date = Some(date);
        self
    }

    /// Restrict to events mentioning `text`.
    #[must_use]
    pub fn matching(mut self, text: &str) -> Self {
        self.text = Some(text.trim().to_lowercase());
        self
    }

    /// Cap the number of events.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an event passes the date and text filters.
    #[must_use]
    pub fn admits(&self, event: &LedgerEvent) -> bool {
        self.date.map_or(true, |d| d.matches(event))
            && self.text.as_deref().map_or(true, |needle| {
                event.attribution.matches_person(needle)
                    || event.gas.as_str().to_lowercase().contains(needle)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Attribution, CylinderCode, EventSeq, GasType, NewEvent};
    use chrono::{TimeZone, Utc};

    fn event_at(year: i32, month: u32, gas: &str, who: &str) -> LedgerEvent {
        let gas = GasType::new(gas);
        NewEvent {
            cylinder_code: CylinderCode::for_serial(&gas, 1),
            gas,
            action: Action::Sell,
            attribution: Attribution::new(who, None, None).unwrap(),
            timestamp: Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
        }
        .into_event(EventSeq::FIRST)
    }

    #[test]
    fn parse_year_and_month() {
        assert_eq!("2024".parse(), Ok(DateFilter::Year(2024)));
        assert_eq!(
            " 2024-05 ".parse(),
            Ok(DateFilter::Month {
                year: 2024,
                month: 5
            })
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["24", "2024-5", "2024-13", "2024-00", "abcd", "2024-05-01", ""] {
            assert!(bad.parse::<DateFilter>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn month_filter_matches_only_that_month() {
        let may: DateFilter = "2024-05".parse().unwrap();
        assert!(may.matches(&event_at(2024, 5, "Oxygen", "Asha")));
        assert!(!may.matches(&event_at(2024, 6, "Oxygen", "Asha")));
        assert!(!may.matches(&event_at(2023, 5, "Oxygen", "Asha")));
    }

    #[test]
    fn year_filter() {
        let year: DateFilter = "2023".parse().unwrap();
        assert!(year.matches(&event_at(2023, 1, "Oxygen", "Asha")));
        assert!(!year.matches(&event_at(2024, 1, "Oxygen", "Asha")));
    }

    #[test]
    fn text_search_covers_gas_and_person() {
        let event = event_at(2024, 5, "Carbon Dioxide", "Ravi Kumar");
        assert!(HistoryQuery::all().matching("dioxide").admits(&event));
        assert!(HistoryQuery::all().matching("RAVI").admits(&event));
        assert!(!HistoryQuery::all().matching("helium").admits(&event));
    }
}
