//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable by the caller: the operation that produced it
/// did not apply any effect. Storage failures are not represented here; they
/// belong to the ledger layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input reached the domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced product does not exist.
    #[error("product {product_id} not found")]
    NotFound { product_id: ProductId },

    /// A sale asked for more units than are on hand.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(product_id: ProductId) -> Self {
        Self::NotFound { product_id }
    }

    pub fn insufficient_stock(product_id: ProductId, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            product_id,
            requested,
            available,
        }
    }
}
