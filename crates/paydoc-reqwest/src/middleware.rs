//! The 402 interceptor: detect the challenge, pay, retry once.

use std::sync::Arc;
use std::time::Duration;

use http::{Extensions, HeaderValue, StatusCode};
use reqwest::{Request, Response};
use reqwest_middleware as rqm;

use paydoc_types::amount::TokenAmount;
use paydoc_types::network::Network;
use paydoc_types::proto::{ChallengeError, PaymentRequired};

use crate::issuer::{CredentialIssuer, IntoCredentialIssuer, IssuerError};
use crate::selector::{
    FirstAcceptable, NoAcceptableRequirement, RequirementSelector, SelectorFilters,
};

/// Header carrying the signed payment credential on the retried request.
pub const PAYMENT_HEADER: &str = "X-Payment";
/// Header carrying the settlement receipt on the settled response.
pub const PAYMENT_RESPONSE_HEADER: &str = "X-Payment-Response";

const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

/// Errors raised while handling a 402 exchange.
///
/// Payment-domain failures keep their original error; anything unexpected
/// during the payment phase is wrapped as [`PaymentError::HandlingFailed`]
/// with the cause attached. Transport failures on either send are not
/// represented here; they propagate as `reqwest` errors.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The 402 body could not be parsed into a challenge.
    #[error(transparent)]
    MalformedChallenge(#[from] ChallengeError),
    /// The configured filters eliminated every offered requirement.
    #[error(transparent)]
    NoAcceptableRequirement(#[from] NoAcceptableRequirement),
    /// The credential issuer failed to sign the selected requirement.
    #[error("failed to issue payment credential")]
    CredentialIssuance(#[from] IssuerError),
    /// The original request could not be cloned for the retry.
    /// This typically happens when the request body is a stream.
    #[error("request object is not cloneable. Are you passing a streaming body?")]
    RequestNotCloneable,
    /// Any other failure while handling the payment, with the cause attached.
    #[error("failed to handle payment")]
    HandlingFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<PaymentError> for rqm::Error {
    fn from(error: PaymentError) -> Self {
        rqm::Error::Middleware(error.into())
    }
}

/// Middleware that settles `402 Payment Required` responses.
///
/// Per logical exchange the interceptor forwards the request unmodified,
/// and on a 402 it reads the challenge, selects one requirement, has the
/// [`CredentialIssuer`] sign it, and resends a clone of the request with
/// the credential attached, exactly once. The retried response becomes the
/// exchange's single response value, so a second 402 reaches the caller
/// as-is and is never paid for again.
///
/// The interceptor holds no per-exchange state; concurrent exchanges over
/// one client are independent.
#[derive(Clone)]
pub struct PaymentInterceptor {
    issuer: Arc<dyn CredentialIssuer>,
    selector: Arc<dyn RequirementSelector>,
    filters: SelectorFilters,
    retry_timeout: Option<Duration>,
}

impl PaymentInterceptor {
    /// Creates an interceptor that signs payments with the given issuer.
    ///
    /// Anything implementing [`IntoCredentialIssuer`] works, including an
    /// `alloy` `PrivateKeySigner` directly.
    pub fn new(issuer: impl IntoCredentialIssuer) -> Self {
        Self {
            issuer: issuer.into_credential_issuer(),
            selector: Arc::new(FirstAcceptable),
            filters: SelectorFilters::default(),
            retry_timeout: None,
        }
    }

    /// Replaces the requirement-selection policy wholesale.
    pub fn with_selector(mut self, selector: impl RequirementSelector + 'static) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    /// Only accept payment requirements settling on the given network.
    pub fn with_network(mut self, network: impl Into<Network>) -> Self {
        self.filters.network = Some(network.into());
        self
    }

    /// Only accept payment requirements using the given scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.filters.scheme = Some(scheme.into());
        self
    }

    /// Refuse payment requirements demanding more than `max`, in token base
    /// units.
    pub fn with_max_value(mut self, max: impl Into<TokenAmount>) -> Self {
        self.filters.max_value = Some(max.into());
        self
    }

    /// Overrides the deadline of the credential-bearing resend.
    ///
    /// Without this, the resend inherits the client's configured timeout,
    /// so the whole exchange (including the retry) stays within one deadline.
    pub fn with_retry_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout = Some(timeout);
        self
    }

    /// Builds the retried request from a 402 response: read the body, parse
    /// the challenge, select a requirement, sign it, attach the headers.
    async fn payment_retry_request(
        &self,
        retry_req: Option<Request>,
        res: Response,
    ) -> Result<Request, PaymentError> {
        let body = res
            .bytes()
            .await
            .map_err(|e| PaymentError::HandlingFailed(e.into()))?;
        let challenge = PaymentRequired::from_json_bytes(&body)?;
        let selected = self.selector.select(&challenge.accepts, &self.filters)?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            network = %selected.network,
            scheme = %selected.scheme,
            amount = %selected.max_amount_required,
            "Selected payment requirement"
        );
        let credential = self
            .issuer
            .payment_header(&selected, challenge.x402_version)
            .await?;

        let mut retry = retry_req.ok_or(PaymentError::RequestNotCloneable)?;
        let headers = retry.headers_mut();
        headers.insert(PAYMENT_HEADER, credential);
        headers.insert(EXPOSE_HEADERS, HeaderValue::from_static(PAYMENT_RESPONSE_HEADER));
        if let Some(timeout) = self.retry_timeout {
            *retry.timeout_mut() = Some(timeout);
        }
        Ok(retry)
    }
}

#[async_trait::async_trait]
impl rqm::Middleware for PaymentInterceptor {
    /// Runs one exchange: forward the request, and on a 402 pay and resend
    /// once. The retried response is returned without re-entering the
    /// interceptor, which is what bounds the exchange to a single retry.
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_req = req.try_clone(); // for the credential-bearing resend

        let res = next.clone().run(req, extensions).await?;

        if res.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(res);
        }

        #[cfg(feature = "telemetry")]
        tracing::debug!(url = %res.url(), "Received 402 Payment Required");

        let retry = self
            .payment_retry_request(retry_req, res)
            .await
            .map_err(Into::<rqm::Error>::into)?;

        next.run(retry, extensions).await
    }
}
