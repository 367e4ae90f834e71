//! Fiat-Shamir identification: challenge issuance and response verification.
//!
//! The verifier knows the public modulus `N` and the public square `f = s^2 mod N`
//! of the prover's secret `s`. Per round `i` the prover commits to `bs[i] = r^2`,
//! receives a challenge bit `c`, and answers `cs[i] = r * s^c`. The round holds
//! iff `cs[i]^2 ≡ f^c * bs[i] (mod N)`. With 32 rounds a prover without `s`
//! passes with probability 2^-32.
//!
//! Lifecycle of an identifier: Idle → ChallengeIssued → Verified | Rejected | Expired.
//! The stored record is removed on the first verification attempt, whatever
//! the outcome.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use num_bigint::BigUint;
use num_traits::One;
use tracing::{debug, trace, warn};
use veil_crypto::{bits_of, mod_mul, mod_square, Guid};

use crate::challenge::{
    challenge_path, StoredChallenge, DEFAULT_CHALLENGE_TTL_SECS, MAX_CHALLENGE_TTL_SECS,
};
use crate::error::AuthError;
use crate::parameters::{ChallengeBits, FiatShamirParameters, Rounds, ROUNDS};
use crate::store::KeyValueStore;

/// Draw one challenge bit per round from the OS CSPRNG.
pub fn random_challenges() -> Result<ChallengeBits, AuthError> {
    let mut bytes = [0u8; ROUNDS / 8];
    getrandom::getrandom(&mut bytes).map_err(|e| AuthError::RngFailed(e.to_string()))?;
    let mut challenges = [false; ROUNDS];
    for (challenge, bit) in challenges.iter_mut().zip(bits_of(&bytes)) {
        *challenge = bit;
    }
    Ok(challenges)
}

// ============================================================================
// FiatShamirKey: verifier's public parameters
// ============================================================================

/// Modulus `N` and public square `f` held by the verifier.
#[derive(Clone)]
pub struct FiatShamirKey {
    modulus: BigUint,
    public_square: BigUint,
}

impl FiatShamirKey {
    pub fn new(modulus: BigUint, public_square: BigUint) -> Result<Self, AuthError> {
        if modulus <= BigUint::one() {
            return Err(AuthError::InvalidKey("modulus must be greater than 1".into()));
        }
        if public_square >= modulus {
            return Err(AuthError::InvalidKey(
                "public square must be reduced modulo N".into(),
            ));
        }
        Ok(Self {
            modulus,
            public_square,
        })
    }

    /// Parse both values from decimal strings.
    pub fn from_decimal(modulus: &str, public_square: &str) -> Result<Self, AuthError> {
        let parse = |name: &str, digits: &str| {
            BigUint::parse_bytes(digits.trim().as_bytes(), 10)
                .ok_or_else(|| AuthError::InvalidKey(format!("{name} is not a decimal integer")))
        };
        Self::new(parse("modulus", modulus)?, parse("public square", public_square)?)
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn public_square(&self) -> &BigUint {
        &self.public_square
    }
}

impl fmt::Debug for FiatShamirKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiatShamirKey")
            .field("modulus_bits", &self.modulus.bits())
            .field("public_square", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// FiatShamirIdentification
// ============================================================================

pub struct FiatShamirIdentification {
    key: FiatShamirKey,
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl FiatShamirIdentification {
    /// Create a verifier with the default 5 minute challenge lifetime.
    pub fn new(key: FiatShamirKey, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key,
            store,
            ttl: Duration::seconds(DEFAULT_CHALLENGE_TTL_SECS as i64),
        }
    }

    /// Override the challenge lifetime, capped at 5 minutes.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl.min(Duration::seconds(MAX_CHALLENGE_TTL_SECS as i64));
        self
    }

    pub fn key(&self) -> &FiatShamirKey {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue 32 random challenge bits for the caller's commitments `bs`.
    ///
    /// Overwrites any earlier record for `identifier`.
    pub async fn generate_challenges(
        &self,
        identifier: &Guid,
        bs: Rounds,
    ) -> Result<ChallengeBits, AuthError> {
        self.generate_challenges_at(identifier, bs, Utc::now()).await
    }

    /// [`Self::generate_challenges`] with an explicit clock reading.
    pub async fn generate_challenges_at(
        &self,
        identifier: &Guid,
        bs: Rounds,
        now: DateTime<Utc>,
    ) -> Result<ChallengeBits, AuthError> {
        let challenges = random_challenges()?;
        let stored = StoredChallenge::new(bs, challenges, now, self.ttl);
        self.store
            .set(&challenge_path(identifier), stored.to_json()?)
            .await?;
        debug!(%identifier, "issued Fiat-Shamir challenges");
        Ok(challenges)
    }

    /// Check the caller's responses against the stored challenge.
    ///
    /// Succeeds at most once per identifier.
    pub async fn verify(&self, params: &FiatShamirParameters) -> Result<(), AuthError> {
        self.verify_at(params, Utc::now()).await
    }

    /// [`Self::verify`] with an explicit clock reading.
    pub async fn verify_at(
        &self,
        params: &FiatShamirParameters,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let identifier = &params.identifier;
        let record = self.store.take(&challenge_path(identifier)).await?;

        let Some(record) = record else {
            warn!(%identifier, "no stored Fiat-Shamir challenge");
            return Err(AuthError::ChallengeNotFound);
        };
        let stored = StoredChallenge::from_json(record)?;

        if stored.is_expired(now) {
            warn!(%identifier, "Fiat-Shamir challenge expired");
            return Err(AuthError::ChallengeExpired);
        }

        self.check_rounds(identifier, &stored, &params.cs)?;
        debug!(%identifier, "Fiat-Shamir identification verified");
        Ok(())
    }

    fn check_rounds(
        &self,
        identifier: &Guid,
        stored: &StoredChallenge,
        cs: &Rounds,
    ) -> Result<(), AuthError> {
        let n = &self.key.modulus;
        let f = &self.key.public_square;

        for (round, ((c, b), &challenge)) in cs
            .iter()
            .zip(stored.bs.iter())
            .zip(stored.challenges.iter())
            .enumerate()
        {
            trace!(%identifier, round, "checking Fiat-Shamir round");
            let c_square = mod_square(c, n)?;
            let expected = if challenge {
                mod_mul(f, b, n)?
            } else {
                b % n
            };
            if c_square != expected {
                warn!(%identifier, "Fiat-Shamir challenge failed");
                return Err(AuthError::ChallengeFailed);
            }
        }
        Ok(())
    }
}
