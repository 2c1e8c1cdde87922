//! Precision-safe decimal types for order prices and sizes.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Outcome-token prices are
//! probabilities quoted in collateral units, so tick compliance must be exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

/// Outcome-token price with exact decimal precision.
///
/// Wraps `Decimal` to keep prices and sizes from being mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// True when the price lies strictly inside (0, 1).
    #[inline]
    pub fn is_probability(&self) -> bool {
        self.0 > Decimal::ZERO && self.0 < Decimal::ONE
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Size/amount with exact decimal precision.
///
/// Used for share counts on limit orders and for the USDC or share amount
/// of market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_is_probability() {
        assert!(Price::new(dec!(0.5)).is_probability());
        assert!(Price::new(dec!(0.0001)).is_probability());
        assert!(!Price::ZERO.is_probability());
        assert!(!Price::new(Decimal::ONE).is_probability());
        assert!(!Price::new(dec!(1.2)).is_probability());
        assert!(!Price::new(dec!(-0.1)).is_probability());
    }

    #[test]
    fn test_price_parse_trims() {
        let price: Price = " 0.42 ".parse().unwrap();
        assert_eq!(price.inner(), dec!(0.42));
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_size_positive() {
        assert!(Size::new(dec!(10)).is_positive());
        assert!(!Size::ZERO.is_positive());
        assert!(!Size::new(dec!(-1)).is_positive());
    }
}
