//! Inventory ledger boundary.
//!
//! The ledger owns the two persisted entities (products and sales) and exposes
//! the operations an operator uses: upsert a product, list products, record a
//! sale, list sales. Domain rules live in the `products`/`sales` crates; this
//! module only loads state, asks those rules for a decision, and persists it.

pub mod in_memory;
mod schema;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryLedger;
pub use r#trait::{Ledger, LedgerError};
pub use sqlite::SqliteLedger;
