//! Products domain module.
//!
//! Business rules for the product catalog and its on-hand stock, implemented
//! as deterministic domain logic (no IO, no storage).

pub mod product;

pub use product::{Product, UpsertOutcome, UpsertProduct, ValidUpsert};
