//! `shopkeeper-core` — domain building blocks shared by the ledger crates.
//!
//! Pure domain primitives only: identifiers, validated value objects and the
//! error taxonomy. No storage, no IO.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ProductId, SaleId};
pub use value_object::{Price, Quantity, ValueObject};
