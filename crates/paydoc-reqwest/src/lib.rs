//! Reqwest middleware for transparent HTTP 402 payment handling.
//!
//! This crate provides [`PaymentInterceptor`], a `reqwest` middleware that
//! watches responses for `402 Payment Required`, acquires a signed payment
//! credential, and retries the request exactly once with the credential
//! attached. Non-402 responses, and a second 402 on the retried request,
//! pass through to the caller untouched.
//!
//! ## Attaching to a client
//!
//! ```rust,no_run
//! use alloy_signer_local::PrivateKeySigner;
//! use paydoc_reqwest::{PaymentInterceptor, ReqwestWithPayments, ReqwestWithPaymentsBuild};
//!
//! let signer = "PRIVATE_KEY".parse::<PrivateKeySigner>().unwrap();
//! let client = reqwest::Client::new()
//!     .with_payments(PaymentInterceptor::new(signer))
//!     .build();
//! ```
//!
//! ## Choosing what to pay
//!
//! Servers may offer several payment requirements. The interceptor picks one
//! with a [`RequirementSelector`], by default [`FirstAcceptable`], which
//! takes the first offer passing the configured network/scheme/amount
//! filters. Callers can replace the whole policy via
//! [`PaymentInterceptor::with_selector`].
//!
//! ## Signing
//!
//! Credential issuance is behind the [`CredentialIssuer`] trait.
//! [`issuer::ExactEvmIssuer`] implements the x402 v1 `exact` scheme for EVM
//! networks (ERC-3009 `transferWithAuthorization` signed via EIP-712).

pub mod issuer;
pub mod middleware;
pub mod selector;

pub use issuer::{CredentialIssuer, IntoCredentialIssuer, IssuerError};
pub use middleware::{
    PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER, PaymentError, PaymentInterceptor,
};
pub use selector::{FirstAcceptable, NoAcceptableRequirement, RequirementSelector, SelectorFilters};

use reqwest::{Client, ClientBuilder};
use reqwest_middleware as rqm;

/// Trait for adding 402 payment handling to reqwest clients.
pub trait ReqwestWithPayments<A> {
    fn with_payments(self, interceptor: PaymentInterceptor) -> ReqwestWithPaymentsBuilder<A>;
}

impl ReqwestWithPayments<Client> for Client {
    fn with_payments(self, interceptor: PaymentInterceptor) -> ReqwestWithPaymentsBuilder<Client> {
        ReqwestWithPaymentsBuilder {
            inner: self,
            interceptor,
        }
    }
}

impl ReqwestWithPayments<ClientBuilder> for ClientBuilder {
    fn with_payments(
        self,
        interceptor: PaymentInterceptor,
    ) -> ReqwestWithPaymentsBuilder<ClientBuilder> {
        ReqwestWithPaymentsBuilder {
            inner: self,
            interceptor,
        }
    }
}

/// Builder produced by [`ReqwestWithPayments::with_payments`].
pub struct ReqwestWithPaymentsBuilder<A> {
    inner: A,
    interceptor: PaymentInterceptor,
}

/// Trait for building the final client from a [`ReqwestWithPaymentsBuilder`].
pub trait ReqwestWithPaymentsBuild {
    type BuildResult;
    type BuilderResult;

    fn build(self) -> Self::BuildResult;
    fn builder(self) -> Self::BuilderResult;
}

impl ReqwestWithPaymentsBuild for ReqwestWithPaymentsBuilder<Client> {
    type BuildResult = rqm::ClientWithMiddleware;
    type BuilderResult = rqm::ClientBuilder;

    fn build(self) -> Self::BuildResult {
        self.builder().build()
    }

    fn builder(self) -> Self::BuilderResult {
        rqm::ClientBuilder::new(self.inner).with(self.interceptor)
    }
}

impl ReqwestWithPaymentsBuild for ReqwestWithPaymentsBuilder<ClientBuilder> {
    type BuildResult = Result<rqm::ClientWithMiddleware, reqwest::Error>;
    type BuilderResult = Result<rqm::ClientBuilder, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let builder = self.builder()?;
        Ok(builder.build())
    }

    fn builder(self) -> Self::BuilderResult {
        let client = self.inner.build()?;
        Ok(rqm::ClientBuilder::new(client).with(self.interceptor))
    }
}
