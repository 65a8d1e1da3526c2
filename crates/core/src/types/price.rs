//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single currency (USD), so a price is just a
//! non-negative decimal amount. Prices travel over JSON as plain numbers
//! (`89`, `64.5`) because that is what the site's UI reads; they are parsed
//! from either numbers or numeric strings.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from whole cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Create a price from whole dollars.
    #[must_use]
    pub fn from_dollars(dollars: u32) -> Self {
        Self(Decimal::from(dollars))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Add two prices, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole-dollar prices stay integers on the wire.
        if self.0.fract().is_zero()
            && let Some(whole) = self.0.to_u64()
        {
            return serializer.serialize_u64(whole);
        }
        // Going through the decimal string gives the nearest f64.
        let value = self.0.to_string().parse::<f64>().unwrap_or_default();
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 0)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&Price::from_dollars(89)).unwrap(),
            "89"
        );
        assert_eq!(
            serde_json::to_string(&Price::from_cents(6450)).unwrap(),
            "64.5"
        );
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_int: Price = serde_json::from_str("65").unwrap();
        let from_str: Price = serde_json::from_str("\"65.00\"").unwrap();
        assert_eq!(from_int, Price::from_dollars(65));
        assert_eq!(from_str.amount(), Decimal::new(6500, 2));
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_checked_times() {
        let price = Price::from_dollars(45);
        assert_eq!(price.checked_times(3), Some(Price::from_dollars(135)));
        assert_eq!(price.checked_times(0), Some(Price::ZERO));
    }

    #[test]
    fn test_checked_add_and_display() {
        let total = Price::from_dollars(89)
            .checked_add(Price::from_cents(1050))
            .unwrap();
        assert_eq!(total.to_string(), "$99.50");

        let max = Price::new(Decimal::MAX).unwrap();
        assert_eq!(max.checked_add(Price::from_dollars(1)), None);
    }

    #[test]
    fn test_fractional_number_round_trip() {
        let price: Price = serde_json::from_str("89.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(8999, 2));
        assert_eq!(serde_json::to_string(&price).unwrap(), "89.99");
    }
}
