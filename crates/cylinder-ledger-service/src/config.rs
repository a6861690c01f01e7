//! Service configuration.

use cylinder_ledger_core::GasCatalog;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:4000").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "./data/cylinder-ledger").
    pub data_dir: String,

    /// Gas types accepted by the ledger.
    pub gas_catalog: GasCatalog,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Maximum number of cylinders in one sell batch.
    pub max_batch_cylinders: usize,

    /// Maximum number of events returned by an event search.
    pub history_limit: usize,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            gas_catalog: std::env::var("GAS_TYPES")
                .map(|list| GasCatalog::from_csv(&list))
                .unwrap_or(defaults.gas_catalog),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_number("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_number("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            max_batch_cylinders: env_number("MAX_BATCH_CYLINDERS")
                .unwrap_or(defaults.max_batch_cylinders),
            history_limit: env_number("HISTORY_LIMIT").unwrap_or(defaults.history_limit),
        }
    }
}

/// Read a numeric environment variable, ignoring unparsable values.
fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = %name, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4000".into(),
            data_dir: "./data/cylinder-ledger".into(),
            gas_catalog: GasCatalog::default(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024, // 64KB
            request_timeout_seconds: 30,
            max_batch_cylinders: 500,
            history_limit: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:4000");
        assert_eq!(config.gas_catalog.len(), 15);
        assert_eq!(config.max_batch_cylinders, 500);
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn unset_number_is_none() {
        assert_eq!(env_number::<u64>("CYLINDER_LEDGER_TEST_UNSET_VARIABLE"), None);
    }
}
