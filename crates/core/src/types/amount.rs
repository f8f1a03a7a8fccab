//! Monetary amounts on invoices.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The text is not a decimal number.
    #[error("amount is not a number: {0}")]
    NotANumber(String),
    /// Invoice amounts cannot be negative.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative decimal amount, rounded to two places.
///
/// Stored as TEXT so no precision is lost to floating point.
///
/// ```
/// use law_office_core::Amount;
///
/// let fee: Amount = "1500.50".parse().unwrap();
/// let tax: Amount = "210.07".parse().unwrap();
/// assert_eq!(fee.checked_add(tax).unwrap().to_string(), "1710.57");
/// assert!("-1".parse::<Amount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero, the default tax amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build an amount from a decimal.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Negative` for values below zero.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        Ok(Self(value.round_dp(2)))
    }

    /// Build an amount from minor units (e.g. cents).
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Negative` for values below zero.
    pub fn from_minor_units(units: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::new(units, 2))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Sum of two amounts, or `None` if it does not fit in a decimal.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| AmountError::NotANumber(s.to_owned()))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_two_places() {
        let amount: Amount = "12".parse().unwrap();
        assert_eq!(amount.to_string(), "12.00");
    }

    #[test]
    fn test_rounds_to_cents() {
        let amount: Amount = "10.005".parse().unwrap();
        assert_eq!(amount.to_string(), "10.00");
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert_eq!("-0.01".parse::<Amount>(), Err(AmountError::Negative));
        assert!(matches!(
            "ten".parse::<Amount>(),
            Err(AmountError::NotANumber(_))
        ));
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Amount::from_minor_units(12_345).unwrap().to_string(), "123.45");
        assert!(Amount::from_minor_units(-1).is_err());
    }

    #[test]
    fn test_checked_add_overflow_is_none() {
        let max: Amount = "79228162514264337593543950335".parse().unwrap();
        let one: Amount = "1".parse().unwrap();
        assert_eq!(max.checked_add(one), None);
        assert_eq!(one.checked_add(one).unwrap().to_string(), "2.00");
    }
}
