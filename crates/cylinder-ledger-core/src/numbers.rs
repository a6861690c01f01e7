//! Number-set specifications for sell batches.
//!
//! A specification is a comma-separated list of serials and inclusive ranges:
//! `"1,3,5-7"` expands to `1, 3, 5, 6, 7`. Parsing is permissive. Tokens that
//! are neither a number nor an `a-b` range are skipped rather than rejected,
//! and are reported back through [`NumberSet::skipped`].

use std::collections::HashSet;

use crate::error::{LedgerError, Result};

/// The serials named by a number-set specification.
///
/// Serials are deduplicated and kept in order of first appearance, which is
/// the order a sell batch processes them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumberSet {
    serials: Vec<u32>,
    skipped: Vec<String>,
}

impl NumberSet {
    /// Parse a specification, expanding at most `max_serials` distinct serials.
    ///
    /// Empty tokens (as in `"1,,2"`) are ignored. A reversed range such as
    /// `"7-5"` covers the same serials as `"5-7"`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchTooLarge` once the expansion exceeds
    /// `max_serials`. Expansion stops there, so oversized ranges are never
    /// materialised.
    pub fn parse(input: &str, max_serials: usize) -> Result<Self> {
        let mut set = Self::default();
        let mut seen = HashSet::new();

        for token in input.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }

            let Some((lo, hi)) = parse_token(token) else {
                tracing::debug!(token = %token, "Skipping malformed cylinder number");
                set.skipped.push(token.to_string());
                continue;
            };

            for serial in lo..=hi {
                if seen.insert(serial) {
                    if set.serials.len() == max_serials {
                        return Err(LedgerError::BatchTooLarge { limit: max_serials });
                    }
                    set.serials.push(serial);
                }
            }
        }

        Ok(set)
    }

    /// Serials in processing order.
    #[must_use]
    pub fn serials(&self) -> &[u32] {
        &self.serials
    }

    /// Tokens that were skipped as malformed.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Number of serials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serials.len()
    }

    /// Whether no serial was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}

/// Parse one token into an inclusive `(low, high)` range.
fn parse_token(token: &str) -> Option<(u32, u32)> {
    match token.split_once('-') {
        Some((a, b)) => {
            let a: u32 = a.trim().parse().ok()?;
            let b: u32 = b.trim().parse().ok()?;
            Some((a.min(b), a.max(b)))
        }
        None => {
            let n: u32 = token.parse().ok()?;
            Some((n, n))
        }
    }
}
