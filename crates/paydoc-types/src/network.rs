//! Network identifiers and canonical-name rewriting.

use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// A payment network identifier, e.g. `base` or `base-sepolia`.
///
/// Some servers advertise Base mainnet by its CAIP-2 chain id
/// (`eip155:8453`); that alias is rewritten to the canonical short name at
/// construction time. Every other value is kept verbatim, so unknown
/// networks still flow through selection and matching untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Network(String);

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "eip155:8453" => Network("base".to_string()),
            _ => Network(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chain id for well-known EVM networks.
    ///
    /// Used when constructing EIP-712 domains for payment signing. Returns
    /// `None` for networks this client has no deployment knowledge of.
    pub fn chain_id(&self) -> Option<u64> {
        match self.0.as_str() {
            "base" => Some(8453),
            "base-sepolia" => Some(84532),
            "polygon" => Some(137),
            "polygon-amoy" => Some(80002),
            "avalanche" => Some(43114),
            "avalanche-fuji" => Some(43113),
            "sei" => Some(1329),
            "sei-testnet" => Some(1328),
            "xdc" => Some(50),
            "xrpl-evm" => Some(1440000),
            _ => None,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Network {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Network::new(s))
    }
}

impl From<&str> for Network {
    fn from(value: &str) -> Self {
        Network::new(value)
    }
}

impl From<String> for Network {
    fn from(value: String) -> Self {
        Network::new(value)
    }
}

impl PartialEq<&str> for Network {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Network::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_base_chain_id_alias() {
        assert_eq!(Network::new("eip155:8453"), "base");
    }

    #[test]
    fn passes_other_values_verbatim() {
        assert_eq!(Network::new("base-sepolia"), "base-sepolia");
        assert_eq!(Network::new("eip155:84532"), "eip155:84532");
        assert_eq!(Network::new("solana"), "solana");
    }

    #[test]
    fn normalizes_on_deserialization() {
        let network: Network = serde_json::from_str("\"eip155:8453\"").unwrap();
        assert_eq!(network, "base");
        assert_eq!(serde_json::to_string(&network).unwrap(), "\"base\"");
    }

    #[test]
    fn chain_id_lookup() {
        assert_eq!(Network::new("base").chain_id(), Some(8453));
        assert_eq!(Network::new("polygon").chain_id(), Some(137));
        assert_eq!(Network::new("made-up-net").chain_id(), None);
    }
}
