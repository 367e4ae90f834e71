//! Hybrid payload crypter.
//!
//! encode: Value → JSON (replacer) → UTF-8 → Vernam → AES-256-CBC → base64
//! decode: base64 → AES-256-CBC → Vernam → UTF-8 → JSON (reviver) → Value

use crate::block::{BlockCipherLayer, IvMode};
use crate::error::CryptoError;
use crate::hash::sha512;
use crate::json::Value;
use crate::keys::CryptionKeys;
use crate::text::{bytes_to_text, text_to_bytes};
use crate::vernam::VernamCipher;

pub struct HybridCrypter {
    vernam: VernamCipher,
    block: BlockCipherLayer,
}

impl HybridCrypter {
    /// Build a crypter from one deployment's key bundle.
    pub fn new(keys: &CryptionKeys, iv_mode: IvMode) -> Result<Self, CryptoError> {
        Ok(Self {
            vernam: VernamCipher::new(keys.vernam_key())?,
            block: BlockCipherLayer::new(
                keys.encryption_key(),
                keys.initialisation_vector(),
                iv_mode,
            )?,
        })
    }

    pub fn iv_mode(&self) -> IvMode {
        self.block.mode()
    }

    /// Vernam first, then the block cipher.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let vernam = self.vernam.encrypt(data)?;
        self.block.encrypt(&vernam)
    }

    /// Exact mirror of [`HybridCrypter::encrypt`].
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let vernam = self.block.decrypt(data)?;
        self.vernam.decrypt(&vernam)
    }

    /// Turn a value into an opaque transport string.
    pub fn encode(&self, value: &Value) -> Result<String, CryptoError> {
        let json = value.to_json_string()?;
        let encrypted = self.encrypt(json.as_bytes())?;
        Ok(bytes_to_text(&encrypted))
    }

    /// Invert [`HybridCrypter::encode`]. Any corruption fails the whole decode.
    pub fn decode(&self, text: &str) -> Result<Value, CryptoError> {
        let encrypted = text_to_bytes(text)?;
        let decrypted = self.decrypt(&encrypted)?;
        let json = String::from_utf8(decrypted).map_err(|_| CryptoError::InvalidUtf8)?;
        Value::from_json_str(&json)
    }

    /// One-way pseudonym for a caller-supplied identifier.
    pub fn hash(&self, value: &str) -> String {
        sha512(value)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;
    use crate::guid::Guid;
    use crate::types::SESSION_KEY_LENGTH;

    fn keys() -> CryptionKeys {
        CryptionKeys::new(
            "an example very very secret key.",
            "unique nonce 16b",
            "0123456789abcdef0123456789abcdef",
        )
        .unwrap()
    }

    fn other_keys() -> CryptionKeys {
        CryptionKeys::new(
            "another example very secret key.",
            "another nonce 16",
            "fedcba9876543210fedcba9876543210",
        )
        .unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        for mode in [IvMode::Fixed, IvMode::PerMessage] {
            let crypter = HybridCrypter::new(&keys(), mode).unwrap();
            let data = b"{\"hello\":\"world\"}";
            let encrypted = crypter.encrypt(data).unwrap();
            assert_eq!(crypter.decrypt(&encrypted).unwrap(), data);
        }
    }

    #[test]
    fn ciphertext_carries_session_key_and_padding() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let data = [1u8; 40];
        let encrypted = crypter.encrypt(&data).unwrap();
        // 40 + 32 = 72 bytes of Vernam output, padded to 80
        assert_eq!(encrypted.len(), 80);
        assert!(encrypted.len() > data.len() + SESSION_KEY_LENGTH);
    }

    #[test]
    fn encode_decode_bigint_and_guid() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let guid = Guid::parse("3FB9B206-DF47-44E0-95B5-59FC7EC50D8D").unwrap();
        let value = Value::object([
            ("a", Value::from(BigInt::from(12))),
            ("b", Value::from(guid)),
        ]);
        let text = crypter.encode(&value).unwrap();
        let decoded = crypter.decode(&text).unwrap();
        assert_eq!(
            decoded,
            Value::object([
                ("a", Value::from(BigInt::from(12))),
                ("b", Value::from("3FB9B206-DF47-44E0-95B5-59FC7EC50D8D")),
            ])
        );
    }

    #[test]
    fn same_value_encodes_differently_each_time() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let value = Value::from("same");
        assert_ne!(crypter.encode(&value).unwrap(), crypter.encode(&value).unwrap());
    }

    #[test]
    fn wrong_bundle_fails_to_decode() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let other = HybridCrypter::new(&other_keys(), IvMode::Fixed).unwrap();
        let text = crypter.encode(&Value::object([("k", "v")])).unwrap();
        assert!(other.decode(&text).is_err());
    }

    #[test]
    fn corrupted_text_fails_to_decode() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        assert!(crypter.decode("%%%").is_err());
        assert!(crypter.decode("").is_err());
        assert!(crypter.decode(&bytes_to_text(&[0u8; 15])).is_err());
    }

    #[test]
    fn tampered_session_key_fails_to_decode() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let text = crypter.encode(&Value::object([("k", "v")])).unwrap();
        let mut bytes = text_to_bytes(&text).unwrap();
        // Flip a bit in the first block, which covers the session key
        bytes[0] ^= 0x01;
        assert!(crypter.decode(&bytes_to_text(&bytes)).is_err());
    }

    #[test]
    fn hash_is_deterministic() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        assert_eq!(crypter.hash("caller-1"), crypter.hash("caller-1"));
        assert_ne!(crypter.hash("caller-1"), crypter.hash("caller-2"));
    }

    /// splitmix64, so the sample is reproducible.
    fn float_samples(count: usize) -> Vec<f64> {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut next = move || {
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };
        let mut samples = Vec::with_capacity(count * 2);
        for _ in 0..count {
            samples.push((next() >> 11) as f64 / (1u64 << 53) as f64 * 1000.0);
            let raw = f64::from_bits(next());
            if raw.is_finite() {
                samples.push(raw);
            }
        }
        samples
    }

    #[test]
    fn floats_survive_encode_decode_exactly() {
        let crypter = HybridCrypter::new(&keys(), IvMode::Fixed).unwrap();
        let numbers: Vec<Value> = float_samples(5_000)
            .into_iter()
            .map(|f| Value::Number(serde_json::Number::from_f64(f).unwrap()))
            .collect();

        let batch = Value::Array(numbers.clone());
        assert_eq!(crypter.decode(&crypter.encode(&batch).unwrap()).unwrap(), batch);

        for number in numbers.iter().take(200) {
            let decoded = crypter.decode(&crypter.encode(number).unwrap()).unwrap();
            assert_eq!(&decoded, number);
        }

        for f in [985.6906946328695, 479.60756426982596, f64::MIN_POSITIVE, -0.1, 1e300] {
            let value = Value::Number(serde_json::Number::from_f64(f).unwrap());
            assert_eq!(crypter.decode(&crypter.encode(&value).unwrap()).unwrap(), value);
        }
    }
}
