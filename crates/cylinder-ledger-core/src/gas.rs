//! Gas types and the configured gas catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Gas types stocked by default.
pub const DEFAULT_GAS_TYPES: [&str; 15] = [
    "Oxygen",
    "M Oxygen",
    "Argon",
    "Callgas",
    "Acetylene",
    "Zerogas",
    "Carbon Dioxide",
    "Ethylene",
    "Helium",
    "Hydraulic Mixture",
    "Other Gas 1",
    "Other Gas 2",
    "Other Gas 3",
    "Other Gas 4",
    "Other Gas 5",
];

/// A gas type name, e.g. `"Carbon Dioxide"`.
///
/// A `GasType` is only a name. Whether it is accepted for a sale is decided by
/// the [`GasCatalog`] the ledger was configured with.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GasType(String);

impl GasType {
    /// Create a gas type from a display name. Surrounding whitespace is dropped.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// The gas name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix used for this gas's cylinder codes.
    ///
    /// Everything except ASCII letters, digits and `_` is removed and the rest
    /// is upper-cased: `"Carbon Dioxide"` becomes `"CARBONDIOXIDE"`.
    #[must_use]
    pub fn cylinder_prefix(&self) -> String {
        self.0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }
}

impl fmt::Debug for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GasType({})", self.0)
    }
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GasType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fixed list of gas types the ledger accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasCatalog {
    gases: Vec<GasType>,
}

impl GasCatalog {
    /// Build a catalog from gas names, keeping the given order.
    ///
    /// Blank names and repeated names are ignored.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut gases: Vec<GasType> = Vec::new();
        for name in names {
            let gas = GasType::new(name);
            if !gas.as_str().is_empty() && !gases.contains(&gas) {
                gases.push(gas);
            }
        }
        Self { gases }
    }

    /// Parse a comma-separated list of gas names.
    ///
    /// Falls back to the default catalog when the list holds no names.
    #[must_use]
    pub fn from_csv(list: &str) -> Self {
        let catalog = Self::new(list.split(','));
        if catalog.is_empty() {
            Self::default()
        } else {
            catalog
        }
    }

    /// Look up a gas by name.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` for a blank name and
    /// `LedgerError::UnknownGas` for a name outside the catalog.
    pub fn resolve(&self, name: &str) -> Result<GasType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingField("gas"));
        }
        self.gases
            .iter()
            .find(|gas| gas.as_str() == name)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownGas(name.to_string()))
    }

    /// Whether the catalog contains this gas.
    #[must_use]
    pub fn contains(&self, gas: &GasType) -> bool {
        self.gases.contains(gas)
    }

    /// Iterate gases in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &GasType> {
        self.gases.iter()
    }

    /// Number of gases in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gases.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gases.is_empty()
    }
}

impl Default for GasCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_GAS_TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_strips_non_word_characters() {
        assert_eq!(GasType::new("Carbon Dioxide").cylinder_prefix(), "CARBONDIOXIDE");
        assert_eq!(GasType::new("M Oxygen").cylinder_prefix(), "MOXYGEN");
        assert_eq!(GasType::new("Other Gas 3").cylinder_prefix(), "OTHERGAS3");
        assert_eq!(GasType::new("N2-O (mix)").cylinder_prefix(), "N2OMIX");
    }

    #[test]
    fn default_catalog_has_all_gases() {
        let catalog = GasCatalog::default();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.iter().next().unwrap().as_str(), "Oxygen");
    }

    #[test]
    fn resolve_known_gas() {
        let catalog = GasCatalog::default();
        let gas = catalog.resolve("  Helium ").unwrap();
        assert_eq!(gas.as_str(), "Helium");
    }

    #[test]
    fn resolve_rejects_unknown_and_blank() {
        let catalog = GasCatalog::default();
        assert_eq!(
            catalog.resolve("Neon"),
            Err(LedgerError::UnknownGas("Neon".into()))
        );
        assert_eq!(catalog.resolve("   "), Err(LedgerError::MissingField("gas")));
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let catalog = GasCatalog::default();
        assert!(catalog.resolve("oxygen").is_err());
    }

    #[test]
    fn catalog_from_csv() {
        let catalog = GasCatalog::from_csv("Oxygen, Argon,,Oxygen");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&GasType::new("Argon")));

        assert_eq!(GasCatalog::from_csv(" , "), GasCatalog::default());
    }

    #[test]
    fn gas_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&GasType::new("Argon")).unwrap();
        assert_eq!(json, "\"Argon\"");
    }
}
