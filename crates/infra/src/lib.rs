//! Infrastructure layer: the persisted inventory ledger and its configuration.

pub mod config;
pub mod ledger;

pub use config::{ConfigError, LedgerConfig};
pub use ledger::{InMemoryLedger, Ledger, LedgerError, SqliteLedger};

#[cfg(test)]
mod integration_tests;
