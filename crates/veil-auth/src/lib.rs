//! Fiat-Shamir identification for veil.
//!
//! This crate provides:
//! - Challenge issuance and single-use response verification
//! - The prover side (commitments and responses)
//! - Parsing of the protocol's wire shapes
//! - The key-value store seam for challenge records, with an in-memory store

mod challenge;
mod error;
mod fiat_shamir;
mod parameters;
mod prover;
mod store;

pub use challenge::{
    challenge_path, StoredChallenge, DEFAULT_CHALLENGE_TTL_SECS, MAX_CHALLENGE_TTL_SECS,
};
pub use error::AuthError;
pub use fiat_shamir::{random_challenges, FiatShamirIdentification, FiatShamirKey};
pub use parameters::{
    challenges_from_value, challenges_to_value, ChallengeBits, ChallengeRequest,
    FiatShamirParameters, Rounds, ROUNDS,
};
pub use prover::{Commitment, Prover};
pub use store::{KeyValueStore, MemoryStore, StoreError};
