//! Tick-grid alignment for order prices.
//!
//! The exchange only accepts prices that are exact multiples of a token's
//! tick size. Alignment counts whole ticks in the price, rounds that step
//! count under the chosen policy, and multiplies back. All arithmetic is exact
//! decimal arithmetic.

use crate::decimal::Price;
use crate::error::CoreError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legal tick sizes on the CLOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickSize {
    #[serde(rename = "0.1")]
    Tenth,
    #[serde(rename = "0.01")]
    Hundredth,
    #[serde(rename = "0.001")]
    Thousandth,
    #[serde(rename = "0.0001")]
    TenThousandth,
}

impl TickSize {
    pub const ALL: [TickSize; 4] = [
        TickSize::Tenth,
        TickSize::Hundredth,
        TickSize::Thousandth,
        TickSize::TenThousandth,
    ];

    /// Literal representation as the exchange reports it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenth => "0.1",
            Self::Hundredth => "0.01",
            Self::Thousandth => "0.001",
            Self::TenThousandth => "0.0001",
        }
    }

    /// Number of decimal places in the tick literal.
    pub fn decimals(&self) -> u32 {
        match self {
            Self::Tenth => 1,
            Self::Hundredth => 2,
            Self::Thousandth => 3,
            Self::TenThousandth => 4,
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(1, self.decimals())
    }

    /// Align `price` to this tick under `rounding`.
    pub fn align(&self, price: Price, rounding: TickRounding) -> Price {
        align_price(price, self.as_decimal(), rounding)
    }

    /// True when `price` already sits exactly on this tick grid.
    pub fn is_aligned(&self, price: Price) -> bool {
        self.align(price, TickRounding::Nearest) == price
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Decimal = s
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidTickSize(s.to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<Decimal> for TickSize {
    type Error = CoreError;

    /// Accepts any representation with the same value ("0.010" is 0.01).
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == value)
            .ok_or_else(|| CoreError::InvalidTickSize(value.to_string()))
    }
}

/// Rounding policy applied to the step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickRounding {
    /// Round half away from zero.
    #[default]
    Nearest,
    /// Floor.
    Down,
    /// Ceil.
    Up,
}

impl TickRounding {
    fn strategy(&self) -> RoundingStrategy {
        match self {
            Self::Nearest => RoundingStrategy::MidpointAwayFromZero,
            Self::Down => RoundingStrategy::ToNegativeInfinity,
            Self::Up => RoundingStrategy::ToPositiveInfinity,
        }
    }
}

impl FromStr for TickRounding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            other => Err(CoreError::Unrecognized(format!("tick rounding {other}"))),
        }
    }
}

/// How an order treats prices that are off the tick grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSizeMode {
    /// Submit the price as given.
    #[default]
    None,
    /// Reject prices that are not on the grid.
    Validate,
    /// Snap prices onto the grid silently.
    Round,
}

impl TickSizeMode {
    /// Whether this mode needs a tick size at all.
    pub fn needs_tick(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Snap `price` to a multiple of `tick` under `rounding`.
///
/// A non-positive tick returns the price unchanged, as does a price too large
/// to express as a whole number of ticks.
pub fn align_price(price: Price, tick: Decimal, rounding: TickRounding) -> Price {
    let tick = tick.normalize();
    if tick <= Decimal::ZERO {
        return price;
    }

    let aligned = price
        .inner()
        .checked_div(tick)
        .map(|steps| steps.round_dp_with_strategy(0, rounding.strategy()))
        .and_then(|steps| steps.checked_mul(tick));

    match aligned {
        Some(aligned) => Price::new(aligned.round_dp(tick.scale()).normalize()),
        None => price,
    }
}
