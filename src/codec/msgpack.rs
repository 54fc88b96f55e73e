//! MsgPack codec using `rmp-serde`.
//!
//! Always `to_vec_named`, never `to_vec`: tagged updates and optional
//! tool-call fields only survive the struct-as-map format.
//!
//! # Example
//!
//! ```
//! use agentwire::codec::MsgPackCodec;
//! use agentwire::Update;
//!
//! let update = Update::TextDelta { text: "hello".to_string() };
//! let encoded = MsgPackCodec::encode(&update).unwrap();
//! let decoded: Update = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, update);
//! ```

use crate::error::Result;

/// MessagePack codec for structured data.
///
/// Uses `rmp_serde::to_vec_named` so structs are serialized as maps
/// (with field names) rather than arrays (positional).
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{ArgValue, ToolCallInfo, Update};
    use crate::error::WireError;

    fn started_read() -> Update {
        let mut info = ToolCallInfo {
            call_id: Some("call_1".to_string()),
            tool_name: Some("read".to_string()),
            ..Default::default()
        };
        info.args.insert("filePath".to_string(), ArgValue::from("a.ts"));
        info.args.insert("limit".to_string(), ArgValue::Uint(200));
        Update::ToolCallStarted { info }
    }

    #[test]
    fn test_update_batch_roundtrip() {
        let updates = vec![
            Update::ThinkingDelta {
                text: "hmm".to_string(),
            },
            started_read(),
            Update::Heartbeat,
        ];

        let encoded = MsgPackCodec::encode(&updates).unwrap();
        let decoded: Vec<Update> = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, updates);
    }

    #[test]
    fn test_boolean_args_survive() {
        let mut info = ToolCallInfo::default();
        info.args.insert("replaceAll".to_string(), ArgValue::Bool(true));
        let update = Update::ToolCallCompleted { info };

        let encoded = MsgPackCodec::encode(&update).unwrap();
        let decoded: Update = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, update);
    }

    #[test]
    fn test_to_vec_named_produces_map_format() {
        // {"type": "text_delta", "text": "x"}: fixmap with 2 entries
        let encoded = MsgPackCodec::encode(&Update::TextDelta {
            text: "x".to_string(),
        })
        .unwrap();
        assert_eq!(encoded[0], 0x82, "Expected fixmap, got {:02X}", encoded[0]);
    }

    #[test]
    fn test_unit_variant_is_single_entry_map() {
        let encoded = MsgPackCodec::encode(&Update::TurnEnded).unwrap();
        assert_eq!(encoded[0], 0x81);
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let result: Result<Update> = MsgPackCodec::decode(b"not valid msgpack");
        assert!(matches!(result, Err(WireError::MsgPackDecode(_))));
    }
}
