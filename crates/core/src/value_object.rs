//! Value objects: compared by value, validated on construction.
//!
//! `Price` and `Quantity` are the two numeric values the ledger stores. Both are
//! only constructible through fallible constructors, so any instance that exists
//! already satisfies its range rules and the rest of the domain does not need to
//! re-check them.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects have no identity: two prices of `5.00` are the same price.
/// They are immutable, so "changing" one means building a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Unit price of a product: a finite, non-negative number.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::invalid_argument(format!(
                "price must be a finite number, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(DomainError::invalid_argument(format!(
                "price cannot be negative, got {value}"
            )));
        }
        // Normalize -0.0 so it renders and compares like 0.0.
        Ok(Self(value + 0.0))
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    pub fn total_for(self, quantity: Quantity) -> f64 {
        self.0 * quantity.get() as f64
    }
}

impl ValueObject for Price {}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A count of units: never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::invalid_argument(format!(
                "quantity cannot be negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| {
                DomainError::invalid_argument(format!(
                    "quantity overflow: {} + {}",
                    self.0, other.0
                ))
            })
    }

    /// Subtract `other`, or `None` if that would leave a negative count.
    pub fn checked_sub(self, other: Quantity) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }
}

impl ValueObject for Quantity {}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rejects_negative_and_non_finite() {
        assert!(matches!(Price::new(-0.01), Err(DomainError::InvalidArgument(_))));
        assert!(matches!(Price::new(f64::NAN), Err(DomainError::InvalidArgument(_))));
        assert!(matches!(Price::new(f64::INFINITY), Err(DomainError::InvalidArgument(_))));
        assert_eq!(Price::new(0.0).unwrap(), Price::zero());
    }

    #[test]
    fn negative_zero_price_displays_as_zero() {
        assert_eq!(Price::new(-0.0).unwrap().to_string(), "0.00");
    }

    #[test]
    fn price_total_multiplies_by_quantity() {
        let price = Price::new(6.0).unwrap();
        assert_eq!(price.total_for(Quantity::new(4).unwrap()), 24.0);
    }

    #[test]
    fn quantity_rejects_negative() {
        assert!(matches!(Quantity::new(-1), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn quantity_add_overflow_is_invalid_argument() {
        let max = Quantity::new(i64::MAX).unwrap();
        let one = Quantity::new(1).unwrap();
        assert!(matches!(max.checked_add(one), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<Price>("-1.5").is_err());
        assert!(serde_json::from_str::<Quantity>("-3").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("3").unwrap().get(), 3);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: subtraction never produces a negative quantity.
            #[test]
            fn checked_sub_never_negative(a in 0i64..1_000_000, b in 0i64..1_000_000) {
                let a = Quantity::new(a).unwrap();
                let b = Quantity::new(b).unwrap();
                match a.checked_sub(b) {
                    Some(rest) => {
                        prop_assert!(rest.get() >= 0);
                        prop_assert_eq!(rest.get() + b.get(), a.get());
                    }
                    None => prop_assert!(b > a),
                }
            }
        }
    }
}
