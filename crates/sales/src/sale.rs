use serde::{Deserialize, Serialize};

use shopkeeper_core::{DomainError, DomainResult, Entity, Price, ProductId, Quantity, SaleId};
use shopkeeper_products::Product;

/// A recorded sale. Immutable once created.
///
/// `total` is captured at sale time; later price changes on the product do not
/// touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    product_id: ProductId,
    quantity: Quantity,
    total: f64,
}

impl Sale {
    pub fn new(id: SaleId, product_id: ProductId, quantity: Quantity, total: f64) -> Self {
        Self {
            id,
            product_id,
            quantity,
            total,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> SaleId {
        self.id
    }
}

/// A sale joined with the sold product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEntry {
    #[serde(flatten)]
    pub sale: Sale,
    pub product_name: String,
}

/// Command: RecordSale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSale {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl RecordSale {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// The quantity to sell, which must be at least one unit.
    pub fn validate(&self) -> DomainResult<Quantity> {
        if self.quantity <= 0 {
            return Err(DomainError::invalid_argument(format!(
                "sale quantity must be positive, got {}",
                self.quantity
            )));
        }
        Quantity::new(self.quantity)
    }

    /// Decide the sale against the product's current state.
    ///
    /// Does not mutate anything; the caller persists the returned quote.
    pub fn quote(&self, product: &Product) -> DomainResult<SaleQuote> {
        let quantity = self.validate()?;

        if product.id() != self.product_id {
            return Err(DomainError::invalid_argument(format!(
                "sale for product {} quoted against product {}",
                self.product_id,
                product.id()
            )));
        }

        let remaining = product.take_stock(quantity)?.quantity();

        Ok(SaleQuote {
            product_id: self.product_id,
            quantity,
            unit_price: product.price(),
            total: product.price().total_for(quantity),
            remaining,
        })
    }
}

/// An accepted sale that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleQuote {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub total: f64,
    /// On-hand quantity once the sale is applied.
    pub remaining: Quantity,
}

impl SaleQuote {
    pub fn into_sale(self, id: SaleId) -> Sale {
        Sale::new(id, self.product_id, self.quantity, self.total)
    }
}
