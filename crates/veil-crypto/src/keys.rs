//! Per-deployment key bundle.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::{AES_BLOCK_LENGTH, AES_KEY_LENGTH, VERNAM_KEY_LENGTH};

/// Secret material for one deployment environment.
///
/// Every field is a UTF-8 string whose byte length is fixed: 32 for the AES
/// key, 16 for the CBC IV, 32 for the Vernam key.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(try_from = "RawCryptionKeys")]
pub struct CryptionKeys {
    encryption_key: String,
    initialisation_vector: String,
    vernam_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCryptionKeys {
    encryption_key: String,
    initialisation_vector: String,
    vernam_key: String,
}

impl TryFrom<RawCryptionKeys> for CryptionKeys {
    type Error = CryptoError;

    fn try_from(mut raw: RawCryptionKeys) -> Result<Self, Self::Error> {
        let keys = CryptionKeys::new(
            raw.encryption_key.as_str(),
            raw.initialisation_vector.as_str(),
            raw.vernam_key.as_str(),
        );
        raw.encryption_key.zeroize();
        raw.initialisation_vector.zeroize();
        raw.vernam_key.zeroize();
        keys
    }
}

fn check_length(name: &'static str, value: &str, expected: usize) -> Result<(), CryptoError> {
    if value.len() != expected {
        return Err(CryptoError::InvalidKeyLength {
            name,
            expected,
            got: value.len(),
        });
    }
    Ok(())
}

impl CryptionKeys {
    pub fn new(
        encryption_key: &str,
        initialisation_vector: &str,
        vernam_key: &str,
    ) -> Result<Self, CryptoError> {
        check_length("encryption key", encryption_key, AES_KEY_LENGTH)?;
        check_length("initialisation vector", initialisation_vector, AES_BLOCK_LENGTH)?;
        check_length("Vernam key", vernam_key, VERNAM_KEY_LENGTH)?;
        Ok(Self {
            encryption_key: encryption_key.to_string(),
            initialisation_vector: initialisation_vector.to_string(),
            vernam_key: vernam_key.to_string(),
        })
    }

    pub fn encryption_key(&self) -> &[u8] {
        self.encryption_key.as_bytes()
    }

    pub fn initialisation_vector(&self) -> &[u8] {
        self.initialisation_vector.as_bytes()
    }

    pub fn vernam_key(&self) -> &[u8] {
        self.vernam_key.as_bytes()
    }
}

impl fmt::Debug for CryptionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptionKeys")
            .field("encryption_key", &"<redacted>")
            .field("initialisation_vector", &"<redacted>")
            .field("vernam_key", &"<redacted>")
            .finish()
    }
}
