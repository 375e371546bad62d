//! On-chain token amounts in base units.

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A precise on-chain token amount in base units (e.g. USDC with 6 decimals).
///
/// The wire format is a base-10 integer string, to prevent precision loss in
/// JSON. The empty string is accepted as zero; servers advertise free
/// resources that way. Fractional or otherwise non-integer input is rejected.
#[derive(Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);
}

/// Error returned when a string is not a valid base-10 token amount.
#[derive(Debug, Clone, thiserror::Error)]
#[error("amount must be a non-negative integer encoded as a decimal string")]
pub struct TokenAmountParseError;

impl FromStr for TokenAmount {
    type Err = TokenAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(TokenAmount::ZERO);
        }
        U256::from_str_radix(s, 10)
            .map(TokenAmount)
            .map_err(|_| TokenAmountParseError)
    }
}

impl TryFrom<&str> for TokenAmount {
    type Error = TokenAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TokenAmount::from_str(value)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        TokenAmount(U256::from(value))
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        TokenAmount(U256::from(value))
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl Debug for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenAmount({})", self.0)
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        let amount: TokenAmount = "1000".parse().unwrap();
        assert_eq!(amount, TokenAmount::from(1000u64));
    }

    #[test]
    fn empty_string_is_zero() {
        let amount: TokenAmount = "".parse().unwrap();
        assert_eq!(amount, TokenAmount::ZERO);
    }

    #[test]
    fn rejects_fractional_and_negative() {
        assert!("12.5".parse::<TokenAmount>().is_err());
        assert!("-3".parse::<TokenAmount>().is_err());
        assert!("1e6".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let amount = TokenAmount::from(123456u64);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"123456\"");
        let back: TokenAmount = serde_json::from_str("\"123456\"").unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn orders_numerically() {
        let small = TokenAmount::from(9u64);
        let large = TokenAmount::from(10u64);
        assert!(small < large);
    }
}
