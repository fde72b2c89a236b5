//! Error types for the protocol layer.

/// Errors raised while encoding or decoding API bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a request body failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The response body was malformed or didn't match the expected type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but is unusable (empty, out of range, ...).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
