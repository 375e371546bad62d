//! Helpers shared across the wire format.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use std::borrow::Cow;
use std::fmt::Display;

/// Bytes of a base64 string, either borrowed from a header or freshly encoded.
///
/// The x402 wire format base64-encodes its JSON payloads into header values
/// (`X-Payment`, `X-Payment-Response`); this wrapper keeps encode and decode
/// in one place and avoids copying when decoding borrowed header bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Bytes<'a>(pub Cow<'a, [u8]>);

impl Base64Bytes<'_> {
    /// Decodes the base64 string bytes into the raw binary payload.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        b64.decode(&self.0)
    }

    /// Encodes raw binary input into base64 string bytes.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Base64Bytes<'static> {
        let encoded = b64.encode(input.as_ref());
        Base64Bytes(Cow::Owned(encoded.into_bytes()))
    }
}

impl AsRef<[u8]> for Base64Bytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> From<&'a [u8]> for Base64Bytes<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Base64Bytes(Cow::Borrowed(slice))
    }
}

impl Display for Base64Bytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let encoded = Base64Bytes::encode(b"hello world");
        assert_eq!(encoded.to_string(), "aGVsbG8gd29ybGQ=");
        assert_eq!(encoded.decode().unwrap(), b"hello world");
    }

    #[test]
    fn decode_rejects_invalid_input() {
        assert!(Base64Bytes::from("not base64!!".as_bytes()).decode().is_err());
    }
}
