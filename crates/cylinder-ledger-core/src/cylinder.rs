//! Cylinder codes and cylinder identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::gas::GasType;

/// A cylinder code such as `OXYGEN0042`.
///
/// Codes are the gas prefix followed by the serial zero-padded to four digits.
/// Wider serials are kept whole (`OXYGEN12345`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CylinderCode(String);

impl CylinderCode {
    /// Build the code for a serial number of the given gas.
    #[must_use]
    pub fn for_serial(gas: &GasType, serial: u32) -> Self {
        Self(format!("{}{serial:04}", gas.cylinder_prefix()))
    }

    /// Parse a code typed in by a user. Whitespace is trimmed and letters are
    /// upper-cased.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` for blank input and
    /// `LedgerError::InvalidCylinderCode` if the code contains anything other
    /// than ASCII letters, digits or `_`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::MissingField("cylinder_code"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(LedgerError::InvalidCylinderCode(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The code as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CylinderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CylinderCode({})", self.0)
    }
}

impl fmt::Display for CylinderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one physical cylinder: its gas and its code.
///
/// Ordered by gas, then code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CylinderKey {
    /// Gas type.
    pub gas: GasType,
    /// Cylinder code.
    pub code: CylinderCode,
}

impl CylinderKey {
    /// Create a key.
    #[must_use]
    pub fn new(gas: GasType, code: CylinderCode) -> Self {
        Self { gas, code }
    }
}

impl fmt::Display for CylinderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.gas, self.code)
    }
}
