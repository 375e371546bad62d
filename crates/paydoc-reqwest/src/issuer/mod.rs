//! Credential issuance: turning a selected requirement into an `X-Payment`
//! header value.
//!
//! The interceptor consumes issuance through the [`CredentialIssuer`] trait
//! and does not care how the credential is produced. [`ExactEvmIssuer`]
//! implements the x402 v1 `exact` scheme for EVM networks.

mod evm;

pub use evm::{
    ExactEvmIssuer, ExactEvmPayload, ExactEvmPayloadAuthorization, EvmSignature, HexEncodedNonce,
    PaymentPayload,
};

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderValue;

use paydoc_types::network::Network;
use paydoc_types::proto::{PaymentRequirements, X402Version};

/// Signs a selected payment requirement into an opaque credential header.
///
/// The returned value goes on the retried request as the `X-Payment` header,
/// exactly as produced; the interceptor never inspects it.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn payment_header(
        &self,
        selected: &PaymentRequirements,
        version: X402Version,
    ) -> Result<HeaderValue, IssuerError>;
}

/// Errors raised while producing a payment credential.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    /// The selected requirement's network has no known chain id to sign for.
    #[error("network {0} has no known chain id")]
    UnsupportedNetwork(Network),
    /// A `payTo` or `asset` value could not be parsed as an EVM address.
    #[error("invalid EVM address: {0}")]
    InvalidAddress(String),
    /// The system clock could not be read for the authorization window.
    #[error("failed to read the system clock")]
    Clock(#[source] std::time::SystemTimeError),
    /// The signer refused or failed to sign the payload.
    #[error("failed to sign payment payload")]
    Signing(#[source] alloy_signer::Error),
    /// The payload could not be serialized to JSON.
    #[error("failed to encode payment payload to json")]
    JsonEncode(#[source] serde_json::Error),
    /// The encoded payload is not a valid HTTP header value.
    #[error("failed to encode payment payload to HTTP header")]
    HeaderValueEncode(#[source] http::header::InvalidHeaderValue),
}

/// Conversion into a shared [`CredentialIssuer`], so signers can be handed
/// to the interceptor directly.
pub trait IntoCredentialIssuer {
    fn into_credential_issuer(self) -> Arc<dyn CredentialIssuer>;
}

impl IntoCredentialIssuer for Arc<dyn CredentialIssuer> {
    fn into_credential_issuer(self) -> Arc<dyn CredentialIssuer> {
        self
    }
}
