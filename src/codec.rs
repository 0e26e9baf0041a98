//! Payload serialization.
//!
//! Arguments and results travel as JSON bytes. Encoding happens when a
//! descriptor is built; decoding happens per slot inside an aggregator.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Encode a value into a call payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Decode a call payload into the expected type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_string() {
        let s: String = decode(br#""hi""#).unwrap();
        assert_eq!(s, "hi");
    }

    #[test]
    fn test_decode_wrong_type_is_error() {
        let err = decode::<i64>(br#""hi""#).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_decode_empty_payload_is_error() {
        assert!(decode::<String>(b"").is_err());
    }

    #[test]
    fn test_encode_tuple() {
        let bytes = encode(&("", 5)).unwrap();
        assert_eq!(bytes, br#"["",5]"#);
    }
}
