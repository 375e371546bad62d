//! The paid parse operation: one intercepted exchange against the service.

use std::fmt;
use std::time::Duration;

use alloy_signer_local::PrivateKeySigner;
use clap::ValueEnum;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use paydoc_reqwest::{
    PAYMENT_RESPONSE_HEADER, PaymentInterceptor, ReqwestWithPayments, ReqwestWithPaymentsBuild,
};
use paydoc_types::amount::TokenAmount;
use paydoc_types::network::Network;
use paydoc_types::receipt::SettlementReceipt;

/// Where and how to reach the parsing service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: Url,
    /// Deadline for the whole exchange, the payment retry included.
    pub timeout: Duration,
}

/// Output format the service should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// What to parse, and the payment constraints to apply.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub document_url: Url,
    pub format: OutputFormat,
    pub vlm: bool,
    /// Only pay on this network, if set.
    pub network: Option<Network>,
    /// Never pay more than this, in token base units.
    pub max_value: Option<TokenAmount>,
}

/// Result of one paid exchange: the service's output, and the settlement
/// transaction id when a payment actually happened.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub result: String,
    pub transaction: Option<String>,
}

/// Failures of the parse operation.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document URL is not fetchable over HTTP.
    #[error("document URL must use http or https, got {0}")]
    UnsupportedScheme(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The exchange failed: transport, or payment handling.
    #[error(transparent)]
    Exchange(#[from] reqwest_middleware::Error),
    /// The response body could not be read.
    #[error("failed to read response body")]
    Body(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct ParseBody<'a> {
    url: &'a str,
    format: OutputFormat,
    vlm: bool,
}

/// Runs one paid exchange: POST the parse request, settle a 402 challenge
/// if the service raises one, and decode the settlement receipt.
///
/// A missing `X-Payment-Response` header means no payment occurred and is
/// not an error; a present but undecodable one is logged and reported as
/// `None`, while the service's result is still returned.
pub async fn parse_document(
    signer: PrivateKeySigner,
    config: &ServiceConfig,
    request: ParseRequest,
) -> Result<ParseOutcome, ParseError> {
    let scheme = request.document_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ParseError::UnsupportedScheme(scheme.to_string()));
    }

    tracing::info!(address = %signer.address(), "initialized payment account");

    let mut interceptor = PaymentInterceptor::new(signer);
    if let Some(network) = request.network {
        interceptor = interceptor.with_network(network);
    }
    if let Some(max_value) = request.max_value {
        interceptor = interceptor.with_max_value(max_value);
    }

    let client = Client::builder()
        .timeout(config.timeout)
        .with_payments(interceptor)
        .build()
        .map_err(ParseError::Client)?;

    let response = client
        .post(config.endpoint.clone())
        .json(&ParseBody {
            url: request.document_url.as_str(),
            format: request.format,
            vlm: request.vlm,
        })
        .send()
        .await?;

    let transaction = match response.headers().get(PAYMENT_RESPONSE_HEADER) {
        None => {
            tracing::debug!("no settlement header on response");
            None
        }
        Some(value) => match value.to_str().map(SettlementReceipt::from_header_value) {
            Ok(Ok(receipt)) => {
                tracing::info!(transaction = %receipt.transaction, "payment settled");
                Some(receipt.transaction)
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "settlement header present but undecodable");
                None
            }
            Err(_) => {
                tracing::warn!("settlement header is not valid ASCII");
                None
            }
        },
    };

    let result = response.text().await.map_err(ParseError::Body)?;
    Ok(ParseOutcome {
        result,
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ParseBody {
            url: "https://example.com/paper.pdf",
            format: OutputFormat::Markdown,
            vlm: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://example.com/paper.pdf",
                "format": "markdown",
                "vlm": true
            })
        );
    }

    #[tokio::test]
    async fn rejects_non_http_document_urls() {
        let signer: PrivateKeySigner =
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse()
                .unwrap();
        let config = ServiceConfig {
            endpoint: "https://service.example/parse".parse().unwrap(),
            timeout: Duration::from_secs(5),
        };
        let request = ParseRequest {
            document_url: "ftp://example.com/paper.pdf".parse().unwrap(),
            format: OutputFormat::Json,
            vlm: false,
            network: None,
            max_value: None,
        };
        let err = parse_document(signer, &config, request).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedScheme(scheme) if scheme == "ftp"));
    }
}
