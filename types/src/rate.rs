//! Fixed-point reward rate.
//!
//! A rate is stored as raw units scaled by [`RATE_SCALE`] (18 decimals). A raw
//! rate of `10^17` means each staked unit earns 0.1 reward units per second.

use crate::error::TypeError;
use crate::units::{format_units, parse_units, UNIT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-point denominator for [`RewardRate`] (`10^18`).
pub const RATE_SCALE: u128 = UNIT;

/// Reward accrued per second per staked unit, in 18-decimal fixed point.
///
/// Immutable once handed to the ledger. Zero is legal and disables rewards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RewardRate(u128);

impl RewardRate {
    pub const ZERO: Self = Self(0);

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Construct from a signed raw value, rejecting negatives.
    pub fn try_from_signed(raw: i128) -> Result<Self, TypeError> {
        u128::try_from(raw)
            .map(Self)
            .map_err(|_| TypeError::Negative(raw.to_string()))
    }

    /// Parse a decimal string such as `"0.1"`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        parse_units(s).map(Self)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for RewardRate {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RewardRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_rate() {
        let rate = RewardRate::parse("0.1").unwrap();
        assert_eq!(rate.raw(), 100_000_000_000_000_000);
        assert_eq!(rate.to_string(), "0.1");
    }

    #[test]
    fn zero_is_legal() {
        let rate: RewardRate = "0".parse().unwrap();
        assert!(rate.is_zero());
        assert_eq!(rate, RewardRate::ZERO);
    }

    #[test]
    fn rejects_negative() {
        assert!(matches!(RewardRate::parse("-0.1"), Err(TypeError::Negative(_))));
        assert!(matches!(RewardRate::try_from_signed(-1), Err(TypeError::Negative(_))));
        assert_eq!(RewardRate::try_from_signed(7).unwrap().raw(), 7);
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(RewardRate::parse("fast"), Err(TypeError::InvalidDecimal(_))));
    }
}
