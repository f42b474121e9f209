//! Conversion between typed records and store values.
//!
//! The store only understands JSON trees. A [`Codec`] turns the records in
//! [`crate::types`] into those trees and back.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::ProtocolError;

/// Converts records to and from store values.
pub trait Codec: Send + Sync + 'static {
    /// Turns a record into a store value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the record cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Value, ProtocolError>;

    /// Reads a record back out of a store value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the value has the wrong shape.
    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, ProtocolError>;

    /// Encodes a record that must be a JSON object, for use with
    /// field-level merges.
    fn encode_fields<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Map<String, Value>, ProtocolError> {
        match self.encode(value)? {
            Value::Object(map) => Ok(map),
            _ => Err(ProtocolError::Encode(serde::ser::Error::custom(
                "record is not an object",
            ))),
        }
    }
}

/// A [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Value, ProtocolError> {
        serde_json::to_value(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, ProtocolError> {
        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Player, RoomMeta};

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let result: Result<Player, _> = JsonCodec.decode(json!({"name": 5}));
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_fields_returns_object_map() {
        let meta = RoomMeta::new("R", vec!["1".into()], 3);
        let fields = JsonCodec.encode_fields(&meta).unwrap();
        assert_eq!(fields.get("name"), Some(&json!("R")));
    }

    #[test]
    fn test_encode_fields_rejects_scalars() {
        let result = JsonCodec.encode_fields(&42);
        assert!(matches!(result, Err(ProtocolError::Encode(_))));
    }
}
