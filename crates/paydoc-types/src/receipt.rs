//! Settlement receipts carried on the `X-Payment-Response` header.

use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::util::Base64Bytes;

/// Decoded confirmation that a payment settled.
///
/// Returned by the server on a successful retried response, base64-encoded
/// in the `X-Payment-Response` header. Only the transaction identifier is
/// guaranteed; the rest is best-effort metadata. A settled response without
/// the header means no settlement occurred (the resource was free) and is
/// not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    /// Transaction identifier of the on-chain settlement.
    pub transaction: String,
    /// The network the settlement happened on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    /// The address that paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Error returned when a settlement header value cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// The header value was not valid base64.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    /// The decoded bytes were not the expected JSON structure.
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SettlementReceipt {
    /// Decodes the value of an `X-Payment-Response` header.
    pub fn from_header_value(value: &str) -> Result<Self, ReceiptError> {
        let decoded = Base64Bytes::from(value.as_bytes()).decode()?;
        let receipt = serde_json::from_slice(&decoded)?;
        Ok(receipt)
    }

    /// Encodes this receipt into a header-ready base64 string.
    pub fn to_header_value(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(Base64Bytes::encode(json).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_header_value() {
        let receipt = SettlementReceipt {
            transaction: "0xabc".to_string(),
            network: Some(Network::new("base")),
            payer: Some("0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_string()),
        };
        let header = receipt.to_header_value().unwrap();
        let decoded = SettlementReceipt::from_header_value(&header).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn transaction_alone_is_enough() {
        let header = Base64Bytes::encode(br#"{"transaction":"0xabc"}"#).to_string();
        let decoded = SettlementReceipt::from_header_value(&header).unwrap();
        assert_eq!(decoded.transaction, "0xabc");
        assert!(decoded.network.is_none());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            SettlementReceipt::from_header_value("%%%"),
            Err(ReceiptError::Base64Decode(_))
        ));
    }

    #[test]
    fn rejects_missing_transaction() {
        let header = Base64Bytes::encode(br#"{"payer":"0xdead"}"#).to_string();
        assert!(matches!(
            SettlementReceipt::from_header_value(&header),
            Err(ReceiptError::Json(_))
        ));
    }
}
