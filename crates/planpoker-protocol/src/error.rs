//! Error types for the protocol layer.

/// Errors that can occur while converting records to and from store
/// values, or while validating identifiers.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A record could not be turned into a store value.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A store value does not have the shape of the expected record.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An identifier cannot be used as a store key.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}
