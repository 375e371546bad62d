//! The 402 challenge body and its payment requirements.
//!
//! These types mirror the x402 v1 wire format. camelCase is the canonical
//! spelling on the wire; snake_case spellings are accepted on input for
//! compatibility with servers that emit them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

use crate::amount::TokenAmount;
use crate::network::Network;

/// Protocol version carried by every x402 message.
///
/// Serialized as a bare integer. Any value is accepted on input; version
/// semantics are the credential issuer's concern, not the parser's.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct X402Version(pub u8);

impl X402Version {
    pub const V1: X402Version = X402Version(1);
}

impl PartialEq<u8> for X402Version {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl Display for X402Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One acceptable way to pay for a resource, as advertised by the server.
///
/// Value object: parsed once from a challenge and never mutated after.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// The payment scheme, e.g. `exact`.
    pub scheme: String,
    /// The network the payment settles on.
    pub network: Network,
    /// The maximum amount the server may draw, in token base units.
    #[serde(alias = "max_amount_required")]
    pub max_amount_required: TokenAmount,
    /// The resource being paid for.
    pub resource: String,
    /// Human-readable description of the resource.
    pub description: String,
    /// MIME type of the resource.
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    /// Optional JSON schema describing the resource output.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "output_schema"
    )]
    pub output_schema: Option<serde_json::Value>,
    /// The recipient address.
    #[serde(alias = "pay_to")]
    pub pay_to: String,
    /// How long the payment authorization stays valid, in seconds.
    #[serde(alias = "max_timeout_seconds")]
    pub max_timeout_seconds: u64,
    /// The token asset the payment is denominated in.
    pub asset: String,
    /// Scheme-specific extra data (e.g. the EIP-712 domain name/version).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// The body of an HTTP 402 response: the server's payment challenge.
///
/// `accepts` preserves the server's preference order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    #[serde(alias = "x402_version")]
    pub x402_version: X402Version,
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
    /// Why the server refused the request without payment.
    pub error: String,
}

/// Error returned when a 402 body cannot be parsed into a [`PaymentRequired`].
#[derive(Debug, thiserror::Error)]
#[error("malformed 402 challenge: {0}")]
pub struct ChallengeError(#[from] serde_json::Error);

impl PaymentRequired {
    /// Parses a 402 response body.
    ///
    /// Fails if required fields are missing, the version is absent, or an
    /// advertised amount is not a non-negative integer string.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ChallengeError> {
        serde_json::from_slice(bytes).map_err(ChallengeError::from)
    }
}
