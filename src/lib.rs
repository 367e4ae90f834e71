//! Fiat-Shamir authenticated, hybrid-encrypted call envelopes.
//!
//! - [`veil_crypto`]: the Vernam + AES-256-CBC payload crypter, bigint/GUID
//!   aware JSON and the SHA-512 pseudonym hash.
//! - [`veil_auth`]: the 32-round Fiat-Shamir identification protocol.
//! - this crate: deployment configuration, the server [`Gateway`] and the
//!   caller-side [`Client`].

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;

pub use client::{Client, PendingProof};
pub use config::{DeploymentType, FiatShamirConfig, KeyRing, VeilConfig, DEPLOYMENT_ENV_VAR};
pub use error::{ErrorCode, Result, VeilError};
pub use gateway::{Gateway, FIAT_SHAMIR_PARAMETERS};

pub use veil_auth;
pub use veil_crypto;
