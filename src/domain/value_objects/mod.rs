//! Value objects for storefront documents

mod card;

pub use card::{luhn_valid, CardBrand, CardNumber, MockCard, MOCK_CARD_NUMBERS};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Rounds half away from zero and pins the scale to two places, so `20` prints as `20.00`.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Decodes a decimal that older writers may have stored as `null` (a `NaN` from a
/// failed number parse serializes that way). `null` reads as zero.
pub fn decimal_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
}

/// Monetary amount, always two decimal places. Serialized as a decimal string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self { Self(round2(amount)) }
    pub fn zero() -> Self { Self::new(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn add(&self, other: &Money) -> Money { Money::new(self.0 + other.0) }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.0 * Decimal::from(qty)) }
}

impl From<Decimal> for Money { fn from(value: Decimal) -> Self { Self::new(value) } }
impl From<Money> for Decimal { fn from(value: Money) -> Self { value.0 } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Weight in pounds, two decimal places. Serialized as a decimal string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Weight(Decimal);

impl Weight {
    pub fn new(value: Decimal) -> Self { Self(round2(value)) }
    pub fn zero() -> Self { Self::new(Decimal::ZERO) }
    pub fn value(&self) -> Decimal { self.0 }
}

impl From<Decimal> for Weight { fn from(value: Decimal) -> Self { Self::new(value) } }
impl From<Weight> for Decimal { fn from(value: Weight) -> Self { value.0 } }

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Line quantity; never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 { return Err(QuantityError::Zero); }
        Ok(Self(value))
    }
    pub fn one() -> Self { Self(1) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}
impl From<Quantity> for u32 { fn from(value: Quantity) -> Self { value.0 } }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { Zero }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "quantity must be at least 1") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_keeps_two_places() {
        let m = Money::new(Decimal::new(20, 0));
        assert_eq!(m.to_string(), "20.00");
        assert_eq!(serde_json::to_value(m).unwrap(), serde_json::json!("20.00"));
    }

    #[test]
    fn test_money_rounds_half_away_from_zero() {
        assert_eq!(Money::new(Decimal::new(10005, 3)).to_string(), "10.01");
        assert_eq!(Money::new(Decimal::new(10004, 3)).to_string(), "10.00");
    }

    #[test]
    fn test_money_accepts_numbers_and_strings() {
        let a: Money = serde_json::from_str("\"49.9\"").unwrap();
        let b: Money = serde_json::from_str("49.9").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "49.90");
    }

    #[test]
    fn test_money_multiply() {
        let price = Money::new(Decimal::new(1999, 2));
        assert_eq!(price.multiply(3).to_string(), "59.97");
    }

    #[test]
    fn test_null_decimal_reads_as_zero() {
        #[derive(Deserialize)]
        struct Line { #[serde(deserialize_with = "decimal_or_zero")] weight: Decimal }
        let line: Line = serde_json::from_str(r#"{"weight":null}"#).unwrap();
        assert_eq!(line.weight, Decimal::ZERO);
        let line: Line = serde_json::from_str(r#"{"weight":"1.5"}"#).unwrap();
        assert_eq!(line.weight, Decimal::new(15, 1));
    }

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(Quantity::new(2).unwrap().add(Quantity::one()).value(), 3);
    }
}
