//! Base64 payload decoding for request-supplied media bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use vidweave_common::error::{VidweaveError, VidweaveResult};

/// Decode a base64 payload, labeling failures with the item it came
/// from. A decode failure fails the whole request before that item's
/// engine call.
pub(crate) fn decode(payload: &str, label: impl Fn() -> String) -> VidweaveResult<Vec<u8>> {
    BASE64
        .decode(payload.trim())
        .map_err(|e| VidweaveError::decode(format!("Invalid base64 payload for {}: {e}", label())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_trims_surrounding_whitespace() {
        let bytes = decode("  aGVsbG8=\n", || "test".to_string()).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_failure_names_the_item() {
        let err = decode("!!!", || "background track 1".to_string()).unwrap_err();
        assert!(matches!(err, VidweaveError::Decode { .. }));
        assert!(err.to_string().contains("background track 1"));
    }
}
