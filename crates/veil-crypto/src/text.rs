//! Byte <-> text mapping for putting ciphertext on the wire.

use base64ct::{Base64, Encoding};

use crate::error::CryptoError;

/// Encode bytes as padded standard base64.
pub fn bytes_to_text(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Decode text produced by [`bytes_to_text`].
pub fn text_to_bytes(text: &str) -> Result<Vec<u8>, CryptoError> {
    Base64::decode_vec(text).map_err(|e| CryptoError::InvalidText(e.to_string()))
}
