//! AES-256-CBC layer wrapping the Vernam output.
//!
//! Wire format depends on [`IvMode`]:
//! - `Fixed`: [ciphertext] under the configured IV
//! - `PerMessage`: [IV:16][ciphertext]
//!
//! Both use PKCS#7 padding, so ciphertext is a non-empty multiple of 16 bytes.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::{AES_BLOCK_LENGTH, AES_KEY_LENGTH};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Where the CBC initialisation vector comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IvMode {
    /// One IV from the key bundle for every message.
    /// Identical plaintext prefixes produce identical ciphertext prefixes.
    #[default]
    Fixed,
    /// Fresh random IV per message, prepended to the ciphertext.
    PerMessage,
}

/// Generate a random 16-byte IV for AES-CBC.
pub fn generate_iv() -> Result<[u8; AES_BLOCK_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_BLOCK_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BlockCipherLayer {
    key: [u8; AES_KEY_LENGTH],
    iv: [u8; AES_BLOCK_LENGTH],
    #[zeroize(skip)]
    mode: IvMode,
}

impl BlockCipherLayer {
    /// Create a block cipher layer.
    ///
    /// # Arguments
    /// * `key` - 32-byte AES-256 key
    /// * `iv` - 16-byte IV, used as-is in `Fixed` mode and ignored in `PerMessage` mode
    /// * `mode` - IV handling
    pub fn new(key: &[u8], iv: &[u8], mode: IvMode) -> Result<Self, CryptoError> {
        let key: [u8; AES_KEY_LENGTH] =
            key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                name: "encryption key",
                expected: AES_KEY_LENGTH,
                got: key.len(),
            })?;
        let iv: [u8; AES_BLOCK_LENGTH] =
            iv.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                name: "initialisation vector",
                expected: AES_BLOCK_LENGTH,
                got: iv.len(),
            })?;
        Ok(Self { key, iv, mode })
    }

    pub fn mode(&self) -> IvMode {
        self.mode
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.mode {
            IvMode::Fixed => cbc_encrypt(&self.key, &self.iv, data),
            IvMode::PerMessage => {
                let iv = generate_iv()?;
                let ciphertext = cbc_encrypt(&self.key, &iv, data)?;
                let mut result = Vec::with_capacity(iv.len() + ciphertext.len());
                result.extend_from_slice(&iv);
                result.extend_from_slice(&ciphertext);
                Ok(result)
            }
        }
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.mode {
            IvMode::Fixed => cbc_decrypt(&self.key, &self.iv, data),
            IvMode::PerMessage => {
                if data.len() < AES_BLOCK_LENGTH {
                    return Err(CryptoError::DataTooShort);
                }
                let (iv, ciphertext) = data.split_at(AES_BLOCK_LENGTH);
                cbc_decrypt(&self.key, iv, ciphertext)
            }
        }
    }
}

fn cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
}

fn cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < AES_BLOCK_LENGTH {
        return Err(CryptoError::DataTooShort);
    }
    if data.len() % AES_BLOCK_LENGTH != 0 {
        return Err(CryptoError::DecryptionFailed(format!(
            "ciphertext length {} is not a multiple of {}",
            data.len(),
            AES_BLOCK_LENGTH
        )));
    }
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| CryptoError::DecryptionFailed("invalid padding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"an example very very secret key.";
    const IV: &[u8; 16] = b"unique nonce 16b";

    #[test]
    fn fixed_round_trip() {
        let layer = BlockCipherLayer::new(KEY, IV, IvMode::Fixed).unwrap();
        for len in [0usize, 1, 15, 16, 17, 100] {
            let data = vec![7u8; len];
            let encrypted = layer.encrypt(&data).unwrap();
            assert_eq!(encrypted.len() % AES_BLOCK_LENGTH, 0);
            assert!(encrypted.len() > len);
            assert_eq!(layer.decrypt(&encrypted).unwrap(), data);
        }
    }

    #[test]
    fn fixed_mode_is_deterministic() {
        let layer = BlockCipherLayer::new(KEY, IV, IvMode::Fixed).unwrap();
        assert_eq!(layer.encrypt(b"same").unwrap(), layer.encrypt(b"same").unwrap());
    }

    #[test]
    fn per_message_round_trip_and_fresh_iv() {
        let layer = BlockCipherLayer::new(KEY, IV, IvMode::PerMessage).unwrap();
        let a = layer.encrypt(b"same").unwrap();
        let b = layer.encrypt(b"same").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), AES_BLOCK_LENGTH * 2);
        assert_eq!(layer.decrypt(&a).unwrap(), b"same");
        assert_eq!(layer.decrypt(&b).unwrap(), b"same");
    }

    #[test]
    fn matches_reference_cbc_vector() {
        // NIST SP 800-38A F.2.5, first block, with PKCS#7 padding appended
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let layer = BlockCipherLayer::new(&key, &iv, IvMode::Fixed).unwrap();
        let encrypted = layer.encrypt(&plaintext).unwrap();
        assert_eq!(
            hex::encode(&encrypted[..AES_BLOCK_LENGTH]),
            "f58c4c04d6e5f1ba779eabfb5f7bfbd6"
        );
        assert_eq!(encrypted.len(), 2 * AES_BLOCK_LENGTH);
    }

    #[test]
    fn wrong_key_fails_or_garbles() {
        let layer = BlockCipherLayer::new(KEY, IV, IvMode::Fixed).unwrap();
        let other = BlockCipherLayer::new(b"another example very secret key.", IV, IvMode::Fixed)
            .unwrap();
        let encrypted = layer.encrypt(b"payload").unwrap();
        match other.decrypt(&encrypted) {
            Ok(decrypted) => assert_ne!(decrypted, b"payload"),
            Err(e) => assert!(matches!(e, CryptoError::DecryptionFailed(_))),
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        let layer = BlockCipherLayer::new(KEY, IV, IvMode::Fixed).unwrap();
        assert!(matches!(layer.decrypt(&[]), Err(CryptoError::DataTooShort)));
        assert!(matches!(
            layer.decrypt(&[0u8; 17]),
            Err(CryptoError::DecryptionFailed(_))
        ));
        let per_message = BlockCipherLayer::new(KEY, IV, IvMode::PerMessage).unwrap();
        assert!(matches!(
            per_message.decrypt(&[0u8; 20]),
            Err(CryptoError::DataTooShort)
        ));
    }

    #[test]
    fn rejects_wrong_key_and_iv_lengths() {
        assert!(BlockCipherLayer::new(b"short", IV, IvMode::Fixed).is_err());
        assert!(BlockCipherLayer::new(KEY, b"short", IvMode::Fixed).is_err());
    }
}
