use std::sync::Arc;

use thiserror::Error;

use shopkeeper_core::{DomainError, ProductId};
use shopkeeper_products::{Product, UpsertOutcome, UpsertProduct};
use shopkeeper_sales::{RecordSale, Sale, SaleEntry};

/// Ledger operation error.
///
/// The first three variants mirror `DomainError` one-to-one and are
/// recoverable: the operation applied no effect. `Storage` carries failures of
/// the underlying store, reported unchanged and never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("product {product_id} not found")]
    NotFound { product_id: ProductId },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the caller can correct the input and try again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(msg) => LedgerError::InvalidArgument(msg),
            DomainError::NotFound { product_id } => LedgerError::NotFound { product_id },
            DomainError::InsufficientStock {
                product_id,
                requested,
                available,
            } => LedgerError::InsufficientStock {
                product_id,
                requested,
                available,
            },
        }
    }
}

/// Inventory and sales ledger over one store.
///
/// ## Semantics
///
/// - `initialize()` creates missing tables and never touches existing rows.
/// - `upsert_product()` matches on the exact product name: an existing product
///   gets its price replaced and the quantity added; otherwise a new product is
///   created.
/// - `record_sale()` checks, in order, that the quantity is positive, that the
///   product exists and that enough stock is on hand; then it writes the sale
///   and the stock decrement atomically.
/// - `list_products()` / `list_sales()` return fresh snapshots ordered by id.
///   Sale entries carry the product's current name.
///
/// Implementations must leave the store unchanged whenever they return an error.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn initialize(&self) -> Result<(), LedgerError>;

    async fn upsert_product(&self, cmd: UpsertProduct) -> Result<UpsertOutcome, LedgerError>;

    async fn list_products(&self) -> Result<Vec<Product>, LedgerError>;

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, LedgerError>;

    async fn record_sale(&self, cmd: RecordSale) -> Result<Sale, LedgerError>;

    async fn list_sales(&self) -> Result<Vec<SaleEntry>, LedgerError>;

    /// Release the underlying store. Further calls may fail.
    async fn close(&self) {}
}

#[async_trait::async_trait]
impl<L> Ledger for Arc<L>
where
    L: Ledger + ?Sized,
{
    async fn initialize(&self) -> Result<(), LedgerError> {
        (**self).initialize().await
    }

    async fn upsert_product(&self, cmd: UpsertProduct) -> Result<UpsertOutcome, LedgerError> {
        (**self).upsert_product(cmd).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        (**self).list_products().await
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, LedgerError> {
        (**self).get_product(product_id).await
    }

    async fn record_sale(&self, cmd: RecordSale) -> Result<Sale, LedgerError> {
        (**self).record_sale(cmd).await
    }

    async fn list_sales(&self) -> Result<Vec<SaleEntry>, LedgerError> {
        (**self).list_sales().await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
