use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid {name} length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Encrypted data too short")]
    DataTooShort,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid transport text: {0}")]
    InvalidText(String),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GUID: \"{0}\"")]
    InvalidGuid(String),

    #[error("Invalid big integer literal: \"{0}\"")]
    InvalidBigInt(String),

    #[error("Modulus must be non-zero")]
    ZeroModulus,

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
