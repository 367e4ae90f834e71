use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid Fiat-Shamir parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid Fiat-Shamir key: {0}")]
    InvalidKey(String),

    #[error("Couldn't get bs and challenges")]
    ChallengeNotFound,

    #[error("bs and challenges are expired")]
    ChallengeExpired,

    #[error("Challenge failed")]
    ChallengeFailed,

    #[error("Stored challenge is corrupt: {0}")]
    CorruptChallenge(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] veil_crypto::CryptoError),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl AuthError {
    /// Whether this failure means the caller did not prove its identity.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::ChallengeNotFound | AuthError::ChallengeExpired | AuthError::ChallengeFailed
        )
    }
}
