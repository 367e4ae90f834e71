//! Unsalted SHA-512 for pseudonymizing caller identities.
//!
//! The digest is a lookup key, not a password hash: equal inputs must map to
//! equal storage keys.

use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha512};

/// SHA-512 of the UTF-8 bytes of `value`, rendered as padded base64 (88 chars).
pub fn sha512(value: &str) -> String {
    Base64::encode_string(&Sha512::digest(value.as_bytes()))
}
