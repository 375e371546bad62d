//! The x402 v1 `exact` scheme on EVM networks.
//!
//! A credential is an ERC-3009 `transferWithAuthorization` message, signed
//! via EIP-712 and base64-encoded into the `X-Payment` header as JSON.

use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use alloy_primitives::{Address, FixedBytes, hex};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolStruct, eip712_domain, sol};
use async_trait::async_trait;
use http::HeaderValue;
use rand::{Rng, rng};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use paydoc_types::amount::TokenAmount;
use paydoc_types::network::Network;
use paydoc_types::proto::{PaymentRequirements, X402Version};
use paydoc_types::timestamp::UnixTimestamp;
use paydoc_types::util::Base64Bytes;

use super::{CredentialIssuer, IntoCredentialIssuer, IssuerError};

/// A 65-byte EVM signature, 0x-prefixed hex on the wire.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct EvmSignature(pub [u8; 65]);

impl From<[u8; 65]> for EvmSignature {
    fn from(bytes: [u8; 65]) -> Self {
        EvmSignature(bytes)
    }
}

impl Debug for EvmSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvmSignature(0x{})", hex::encode(self.0))
    }
}

impl Serialize for EvmSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for EvmSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        static SIG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^0x[0-9a-fA-F]{130}$").expect("Invalid regex for EVM signature")
        });

        if !SIG_REGEX.is_match(&s) {
            return Err(serde::de::Error::custom(
                "Invalid EVM signature format: must be 0x-prefixed and 130 hex chars",
            ));
        }

        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|_| serde::de::Error::custom("Failed to decode EVM signature hex string"))?;
        let array: [u8; 65] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Signature must be exactly 65 bytes"))?;
        Ok(EvmSignature(array))
    }
}

/// A 32-byte random nonce, 0x-prefixed hex on the wire.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct HexEncodedNonce(pub [u8; 32]);

impl Debug for HexEncodedNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexEncodedNonce(0x{})", hex::encode(self.0))
    }
}

impl Serialize for HexEncodedNonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for HexEncodedNonce {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        static NONCE_REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("Invalid nonce regex"));

        if !NONCE_REGEX.is_match(&s) {
            return Err(serde::de::Error::custom("Invalid nonce format"));
        }

        let bytes =
            hex::decode(&s[2..]).map_err(|_| serde::de::Error::custom("Invalid hex in nonce"))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid length for nonce"))?;
        Ok(HexEncodedNonce(array))
    }
}

/// The EIP-712 message of an ERC-3009 transfer authorization: who may move
/// how much, to whom, and during which window.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmPayloadAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: TokenAmount,
    pub valid_after: UnixTimestamp,
    pub valid_before: UnixTimestamp,
    pub nonce: HexEncodedNonce,
}

/// Signature plus the authorization it covers.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmPayload {
    pub signature: EvmSignature,
    pub authorization: ExactEvmPayloadAuthorization,
}

/// The decoded content of an `X-Payment` header for the `exact` scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: X402Version,
    pub scheme: String,
    pub network: Network,
    pub payload: ExactEvmPayload,
}

sol!(
    /// ERC-3009 `transferWithAuthorization` in EIP-712 typed-data form,
    /// used to compute the signing hash.
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
);

/// Issues `exact`-scheme credentials by signing ERC-3009 authorizations
/// with an EIP-712-capable signer.
#[derive(Clone)]
pub struct ExactEvmIssuer {
    signer: Arc<dyn Signer + Send + Sync>,
}

impl ExactEvmIssuer {
    pub fn new(signer: impl Signer + Send + Sync + 'static) -> Self {
        Self {
            signer: Arc::new(signer),
        }
    }
}

impl IntoCredentialIssuer for ExactEvmIssuer {
    fn into_credential_issuer(self) -> Arc<dyn CredentialIssuer> {
        Arc::new(self)
    }
}

impl IntoCredentialIssuer for PrivateKeySigner {
    fn into_credential_issuer(self) -> Arc<dyn CredentialIssuer> {
        Arc::new(ExactEvmIssuer::new(self))
    }
}

fn evm_address(value: &str) -> Result<Address, IssuerError> {
    Address::from_str(value).map_err(|_| IssuerError::InvalidAddress(value.to_string()))
}

#[async_trait]
impl CredentialIssuer for ExactEvmIssuer {
    async fn payment_header(
        &self,
        selected: &PaymentRequirements,
        version: X402Version,
    ) -> Result<HeaderValue, IssuerError> {
        // EIP-712 domain fields come from the token deployment advertised
        // by the server, when it bothers to include them.
        let (name, domain_version) = match &selected.extra {
            None => (None, None),
            Some(extra) => {
                let name = extra
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(ToOwned::to_owned);
                let domain_version = extra
                    .get("version")
                    .and_then(|v| v.as_str())
                    .map(ToOwned::to_owned);
                (name, domain_version)
            }
        };
        let chain_id = selected
            .network
            .chain_id()
            .ok_or_else(|| IssuerError::UnsupportedNetwork(selected.network.clone()))?;
        let verifying_contract = evm_address(&selected.asset)?;
        let domain = eip712_domain! {
            name: name.unwrap_or_default(),
            version: domain_version.unwrap_or_default(),
            chain_id: chain_id,
            verifying_contract: verifying_contract,
        };

        let now = UnixTimestamp::try_now().map_err(IssuerError::Clock)?;
        let valid_after = now.saturating_sub(10 * 60); // tolerate clock skew
        let valid_before = now + selected.max_timeout_seconds;
        let nonce: [u8; 32] = rng().random();
        let authorization = ExactEvmPayloadAuthorization {
            from: self.signer.address(),
            to: evm_address(&selected.pay_to)?,
            value: selected.max_amount_required,
            valid_after,
            valid_before,
            nonce: HexEncodedNonce(nonce),
        };
        let message = TransferWithAuthorization {
            from: authorization.from,
            to: authorization.to,
            value: authorization.value.into(),
            validAfter: valid_after.into(),
            validBefore: valid_before.into(),
            nonce: FixedBytes(nonce),
        };
        let digest = message.eip712_signing_hash(&domain);
        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(IssuerError::Signing)?;

        let payload = PaymentPayload {
            x402_version: version,
            scheme: "exact".to_string(),
            network: selected.network.clone(),
            payload: ExactEvmPayload {
                signature: EvmSignature::from(signature.as_bytes()),
                authorization,
            },
        };
        let json = serde_json::to_vec(&payload).map_err(IssuerError::JsonEncode)?;
        let encoded = Base64Bytes::encode(json);
        HeaderValue::from_bytes(encoded.as_ref()).map_err(IssuerError::HeaderValueEncode)
    }
}
