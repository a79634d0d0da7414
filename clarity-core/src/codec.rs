//! Serialization seam shared by every layer that persists entities
//!
//! The wire format of the remote service is owned by whichever engine is
//! plugged in here. [`JsonCodec`] is the engine used when nothing else is
//! configured.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Failure to turn a value into bytes or back
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be written
    #[error("failed to encode: {0}")]
    Encode(String),

    /// The bytes do not describe a value of the expected type
    #[error("failed to decode: {0}")]
    Decode(String),
}

/// Converts typed records to bytes and back
pub trait Codec: Send + Sync + 'static {
    /// Serialize a value
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserialize a value of the expected type
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// Pretty-printed JSON via serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec_pretty(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<Probe, _> = codec.decode(b"<sample>not json</sample>");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_json_codec_preserves_fields() {
        let codec = JsonCodec;
        let bytes = codec
            .encode(&Probe {
                name: "34_a".to_string(),
                count: 3,
            })
            .unwrap();
        let probe: Probe = codec.decode(&bytes).unwrap();
        assert_eq!(probe.name, "34_a");
        assert_eq!(probe.count, 3);
    }
}
