//! Ledger configuration loading.
//!
//! Configuration comes from the process environment. `from_lookup` takes the
//! lookup as a function so tests can supply values without touching the real
//! environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the SQLite database URL.
pub const DATABASE_URL_VAR: &str = "SHOPKEEPER_DATABASE_URL";

/// Environment variable holding the connection pool size.
pub const MAX_CONNECTIONS_VAR: &str = "SHOPKEEPER_MAX_CONNECTIONS";

/// Database used when nothing is configured: a file next to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://shopkeeper.db";

const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the SQLite-backed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// sqlx SQLite URL (`sqlite://path`, `sqlite:path`, a bare path, or `sqlite::memory:`).
    pub database_url: String,
    /// Pool size. The ledger is single-operator, so one connection is enough.
    pub max_connections: u32,
    /// Create the database file on first connect.
    pub create_if_missing: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
            create_if_missing: true,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.database_url = url;
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let parsed = raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                key: MAX_CONNECTIONS_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidValue {
                    key: MAX_CONNECTIONS_VAR,
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.max_connections = parsed;
        }

        Ok(config)
    }

    /// A private in-memory database, discarded when the ledger is closed.
    pub fn in_memory() -> Self {
        Self {
            database_url: IN_MEMORY_DATABASE_URL.to_string(),
            max_connections: 1,
            create_if_missing: true,
        }
    }

    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
