use std::fmt;

use thiserror::Error;
use veil_auth::AuthError;
use veil_crypto::CryptoError;

use crate::config::DeploymentType;

/// Status reported to a caller when a protected call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed proof material or parameters.
    InvalidArgument,
    /// Missing identity, or a missing/expired/failed challenge.
    Unauthenticated,
    /// Transport or decode failure, or a broken server invariant.
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum VeilError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No key bundle configured for deployment \"{0}\"")]
    MissingKeys(DeploymentType),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VeilError>;

impl VeilError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VeilError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            VeilError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            VeilError::Auth(AuthError::InvalidParameters(_)) => ErrorCode::InvalidArgument,
            VeilError::Auth(e) if e.is_unauthenticated() => ErrorCode::Unauthenticated,
            VeilError::Auth(_)
            | VeilError::Crypto(_)
            | VeilError::Config(_)
            | VeilError::MissingKeys(_)
            | VeilError::Io(_) => ErrorCode::Internal,
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Internal failures collapse to one generic message; protocol failures
    /// keep their fixed text, which never names a failing round.
    pub fn public_message(&self) -> String {
        match self.code() {
            ErrorCode::InvalidArgument | ErrorCode::Unauthenticated => match self {
                VeilError::Auth(e) => e.to_string(),
                VeilError::InvalidArgument(m) | VeilError::Unauthenticated(m) => m.clone(),
                other => other.to_string(),
            },
            ErrorCode::Internal => "Internal error".to_string(),
        }
    }
}
