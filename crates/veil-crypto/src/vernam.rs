//! Session-keyed Vernam stream cipher.
//!
//! Wire format: [session key:32 ASCII alphanumerics][payload XOR keystream]
//! The keystream is seeded with `session key || secret Vernam key`, so the
//! receiver rebuilds it from the prefix alone.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bits::{bits_of, pack_bits, xor_bits};
use crate::error::CryptoError;
use crate::keystream::Keystream;
use crate::types::{SESSION_KEY_LENGTH, VERNAM_KEY_LENGTH};

const SESSION_KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random session key of ASCII alphanumerics.
///
/// Uses rejection sampling so every character is equally likely.
pub fn generate_session_key() -> Result<[u8; SESSION_KEY_LENGTH], CryptoError> {
    let alphabet_len = SESSION_KEY_ALPHABET.len();
    let limit = 256 - 256 % alphabet_len;
    let mut key = [0u8; SESSION_KEY_LENGTH];
    let mut filled = 0;
    let mut pool = [0u8; SESSION_KEY_LENGTH];
    while filled < SESSION_KEY_LENGTH {
        getrandom::getrandom(&mut pool).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
        for &byte in pool.iter() {
            if (byte as usize) < limit && filled < SESSION_KEY_LENGTH {
                key[filled] = SESSION_KEY_ALPHABET[byte as usize % alphabet_len];
                filled += 1;
            }
        }
    }
    pool.zeroize();
    Ok(key)
}

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VernamCipher {
    key: Vec<u8>,
}

impl VernamCipher {
    /// Create a cipher from the 32-byte secret Vernam key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != VERNAM_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                name: "Vernam key",
                expected: VERNAM_KEY_LENGTH,
                got: key.len(),
            });
        }
        Ok(Self { key: key.to_vec() })
    }

    /// Encrypt under a fresh session key. Output is `data.len() + 32` bytes.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut session_key = generate_session_key()?;
        let keystream = self.keystream(&session_key);

        let mut result = Vec::with_capacity(SESSION_KEY_LENGTH + data.len());
        result.extend_from_slice(&session_key);
        result.extend(pack_bits(xor_bits(keystream, bits_of(data))));
        session_key.zeroize();
        Ok(result)
    }

    /// Decrypt `[session key][payload]` produced by [`VernamCipher::encrypt`].
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() < SESSION_KEY_LENGTH {
            return Err(CryptoError::DataTooShort);
        }
        let (session_key, payload) = data.split_at(SESSION_KEY_LENGTH);
        let keystream = self.keystream(session_key);
        Ok(pack_bits(xor_bits(keystream, bits_of(payload))))
    }

    fn keystream(&self, session_key: &[u8]) -> Keystream {
        let mut seed = Vec::with_capacity(session_key.len() + self.key.len());
        seed.extend_from_slice(session_key);
        seed.extend_from_slice(&self.key);
        let keystream = Keystream::new(&seed);
        seed.zeroize();
        keystream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = VernamCipher::new(KEY).unwrap();
        let plaintext = b"Hello, World!";
        let encrypted = cipher.encrypt(plaintext).unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn output_is_input_plus_session_key() {
        let cipher = VernamCipher::new(KEY).unwrap();
        for len in [0usize, 1, 31, 32, 33, 1000] {
            let data = vec![0xabu8; len];
            let encrypted = cipher.encrypt(&data).unwrap();
            assert_eq!(encrypted.len(), len + SESSION_KEY_LENGTH);
            assert_eq!(cipher.decrypt(&encrypted).unwrap(), data);
        }
    }

    #[test]
    fn session_key_is_alphanumeric_and_fresh() {
        let cipher = VernamCipher::new(KEY).unwrap();
        let a = cipher.encrypt(b"same").unwrap();
        let b = cipher.encrypt(b"same").unwrap();
        assert!(a[..SESSION_KEY_LENGTH]
            .iter()
            .all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a[..SESSION_KEY_LENGTH], b[..SESSION_KEY_LENGTH]);
        assert_ne!(a[SESSION_KEY_LENGTH..], b[SESSION_KEY_LENGTH..]);
    }

    #[test]
    fn wrong_vernam_key_garbles() {
        let cipher = VernamCipher::new(KEY).unwrap();
        let other = VernamCipher::new(b"fedcba9876543210fedcba9876543210").unwrap();
        let encrypted = cipher.encrypt(b"attack at dawn").unwrap();
        assert_ne!(other.decrypt(&encrypted).unwrap(), b"attack at dawn");
    }

    #[test]
    fn rejects_short_input() {
        let cipher = VernamCipher::new(KEY).unwrap();
        assert!(matches!(
            cipher.decrypt(&[0u8; SESSION_KEY_LENGTH - 1]),
            Err(CryptoError::DataTooShort)
        ));
    }

    #[test]
    fn rejects_wrong_key_length() {
        let err = VernamCipher::new(b"short").err().unwrap();
        assert!(err.to_string().contains("expected 32 bytes, got 5"));
    }
}
