//! Codec trait and implementations for request and response bodies.
//!
//! The accounting client never calls `serde_json` directly; it goes through
//! a [`Codec`] so the body format stays swappable and decode failures come
//! back as one error type.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to body bytes and decodes them back.
///
/// `Send + Sync + 'static` because the codec lives inside the accounting
/// client, which is shared with the reward actor task.
pub trait Codec: Send + Sync + 'static {
    /// MIME type sent in the `Content-Type` header for encoded bodies.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`. Behind the `json` feature (default).
///
/// ```rust
/// use adreward_protocol::{BalanceUpdate, Codec, Credits, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&BalanceUpdate { balance: Credits(250) }).unwrap();
/// assert_eq!(bytes, br#"{"balance":250}"#);
///
/// let decoded: BalanceUpdate = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.balance, Credits(250));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        // An empty body is a common server reply for 204-style endpoints;
        // name it explicitly instead of surfacing serde's EOF message.
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidMessage("empty body".into()));
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
