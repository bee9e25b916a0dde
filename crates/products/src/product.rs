use serde::{Deserialize, Serialize};

use shopkeeper_core::{DomainError, DomainResult, Entity, Price, ProductId, Quantity};

/// A stocked item: name, unit price and on-hand quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Price,
    quantity: Quantity,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// State after a repeated upsert of this product's name.
    ///
    /// Price is replaced by the incoming one, quantity is added to what is on
    /// hand. `self` is left untouched.
    pub fn restock(&self, upsert: &ValidUpsert) -> DomainResult<Product> {
        if upsert.name != self.name {
            return Err(DomainError::invalid_argument(format!(
                "upsert for '{}' applied to product '{}'",
                upsert.name, self.name
            )));
        }

        Ok(Product {
            id: self.id,
            name: self.name.clone(),
            price: upsert.price,
            quantity: self.quantity.checked_add(upsert.quantity)?,
        })
    }

    /// State after `quantity` units leave stock.
    pub fn take_stock(&self, quantity: Quantity) -> DomainResult<Product> {
        let remaining = self.quantity.checked_sub(quantity).ok_or_else(|| {
            DomainError::insufficient_stock(self.id, quantity.get(), self.quantity.get())
        })?;

        Ok(Product {
            quantity: remaining,
            ..self.clone()
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Command: UpsertProduct.
///
/// Raw scalars as collected from the operator. `quantity` is the amount to
/// add, not the new absolute stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertProduct {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl UpsertProduct {
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn validate(&self) -> DomainResult<ValidUpsert> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_argument("name cannot be empty"));
        }

        Ok(ValidUpsert {
            name: self.name.clone(),
            price: Price::new(self.price)?,
            quantity: Quantity::new(self.quantity)?,
        })
    }
}

/// An `UpsertProduct` whose fields passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidUpsert {
    name: String,
    price: Price,
    quantity: Quantity,
}

impl ValidUpsert {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// The product this upsert creates once the store has assigned an id.
    pub fn into_product(self, id: ProductId) -> Product {
        Product::new(id, self.name, self.price, self.quantity)
    }
}

/// Result of an upsert: which branch was taken and the product's new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "product", rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created(Product),
    Restocked(Product),
}

impl UpsertOutcome {
    pub fn product(&self) -> &Product {
        match self {
            UpsertOutcome::Created(p) | UpsertOutcome::Restocked(p) => p,
        }
    }

    pub fn into_product(self) -> Product {
        match self {
            UpsertOutcome::Created(p) | UpsertOutcome::Restocked(p) => p,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new(
            ProductId::new(1),
            "Widget",
            Price::new(5.0).unwrap(),
            Quantity::new(10).unwrap(),
        )
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = UpsertProduct::new("   ", 1.0, 1).validate().unwrap_err();
        assert_eq!(err, DomainError::invalid_argument("name cannot be empty"));
    }

    #[test]
    fn validate_rejects_negative_price_and_quantity() {
        assert!(matches!(
            UpsertProduct::new("Widget", -1.0, 1).validate(),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            UpsertProduct::new("Widget", 1.0, -1).validate(),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn validate_keeps_name_exactly() {
        let valid = UpsertProduct::new(" Widget ", 1.0, 0).validate().unwrap();
        assert_eq!(valid.name(), " Widget ");
    }

    #[test]
    fn into_product_uses_assigned_id() {
        let product = UpsertProduct::new("Widget", 5.0, 10)
            .validate()
            .unwrap()
            .into_product(ProductId::new(9));
        assert_eq!(product.id(), ProductId::new(9));
        assert_eq!(product.quantity().get(), 10);
        assert_eq!(product.price().get(), 5.0);
    }

    #[test]
    fn restock_adds_quantity_and_replaces_price() {
        let upsert = UpsertProduct::new("Widget", 6.0, 5).validate().unwrap();
        let restocked = widget().restock(&upsert).unwrap();

        assert_eq!(restocked.id(), ProductId::new(1));
        assert_eq!(restocked.quantity().get(), 15);
        assert_eq!(restocked.price().get(), 6.0);
    }

    #[test]
    fn restock_rejects_other_name() {
        let upsert = UpsertProduct::new("Gadget", 6.0, 5).validate().unwrap();
        assert!(matches!(
            widget().restock(&upsert),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn restock_does_not_mutate_original() {
        let product = widget();
        let before = product.clone();
        let upsert = UpsertProduct::new("Widget", 6.0, 5).validate().unwrap();
        let _ = product.restock(&upsert).unwrap();
        assert_eq!(product, before);
    }

    #[test]
    fn take_stock_rejects_more_than_on_hand() {
        let err = widget().take_stock(Quantity::new(11).unwrap()).unwrap_err();
        assert_eq!(
            err,
            DomainError::insufficient_stock(ProductId::new(1), 11, 10)
        );
    }

    #[test]
    fn take_stock_can_empty_the_shelf() {
        let emptied = widget().take_stock(Quantity::new(10).unwrap()).unwrap();
        assert!(emptied.quantity().is_zero());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = UpsertOutcome::Created(widget());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "created");
        assert_eq!(json["product"]["name"], "Widget");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: restock is additive on quantity and last-write-wins on price.
            #[test]
            fn restock_is_additive_and_last_write_wins(
                start_price in 0.0f64..10_000.0,
                start_qty in 0i64..1_000_000,
                new_price in 0.0f64..10_000.0,
                add_qty in 0i64..1_000_000,
            ) {
                let product = Product::new(
                    ProductId::new(1),
                    "Widget",
                    Price::new(start_price).unwrap(),
                    Quantity::new(start_qty).unwrap(),
                );
                let upsert = UpsertProduct::new("Widget", new_price, add_qty).validate().unwrap();
                let restocked = product.restock(&upsert).unwrap();

                prop_assert_eq!(restocked.quantity().get(), start_qty + add_qty);
                prop_assert_eq!(restocked.price().get(), new_price);
                prop_assert_eq!(restocked.id(), product.id());
            }

            /// Property: taking stock succeeds exactly when enough is on hand.
            #[test]
            fn take_stock_succeeds_iff_enough_on_hand(
                on_hand in 0i64..10_000,
                requested in 0i64..10_000,
            ) {
                let product = Product::new(
                    ProductId::new(1),
                    "Widget",
                    Price::zero(),
                    Quantity::new(on_hand).unwrap(),
                );
                let result = product.take_stock(Quantity::new(requested).unwrap());

                if requested <= on_hand {
                    prop_assert_eq!(result.unwrap().quantity().get(), on_hand - requested);
                } else {
                    let is_insufficient = matches!(result, Err(DomainError::InsufficientStock { .. }));
                    prop_assert!(is_insufficient);
                }
            }
        }
    }
}
