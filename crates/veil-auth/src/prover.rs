//! Prover side of the identification protocol.
//!
//! Holds the secret `s`. For each proof it commits to 32 fresh blinding
//! factors `r` (sending `bs = r^2 mod N`), then answers the server's challenge
//! bits with `cs = r * s^c mod N`.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use veil_crypto::{mod_mul, mod_pow, mod_square};

use crate::error::AuthError;
use crate::parameters::{ChallengeBits, Rounds, ROUNDS};

/// Draw a uniform-ish value in `[1, modulus)` coprime to `modulus`.
///
/// Oversamples by 64 bits before reducing, so the modulo bias is negligible.
fn random_unit(modulus: &BigUint) -> Result<BigUint, AuthError> {
    let len = (modulus.bits() as usize).div_ceil(8) + 8;
    let mut bytes = vec![0u8; len];
    loop {
        getrandom::getrandom(&mut bytes).map_err(|e| AuthError::RngFailed(e.to_string()))?;
        let candidate = BigUint::from_bytes_be(&bytes) % modulus;
        if !candidate.is_zero() && candidate.gcd(modulus).is_one() {
            return Ok(candidate);
        }
    }
}

pub struct Prover {
    modulus: BigUint,
    secret: BigUint,
    public_square: BigUint,
}

impl Prover {
    /// Create a prover for `secret` under `modulus`. The verifier is given
    /// [`Prover::public_square`].
    pub fn new(modulus: BigUint, secret: BigUint) -> Result<Self, AuthError> {
        if modulus <= BigUint::one() {
            return Err(AuthError::InvalidKey("modulus must be greater than 1".into()));
        }
        let secret = secret % &modulus;
        if secret.is_zero() || !secret.gcd(&modulus).is_one() {
            return Err(AuthError::InvalidKey(
                "secret must be coprime to the modulus".into(),
            ));
        }
        let public_square = mod_square(&secret, &modulus)?;
        Ok(Self {
            modulus,
            secret,
            public_square,
        })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// `f = s^2 mod N`.
    pub fn public_square(&self) -> &BigUint {
        &self.public_square
    }

    /// Start a proof: draw blinding factors and compute the commitments.
    pub fn commit(&self) -> Result<Commitment, AuthError> {
        let mut rs = Vec::with_capacity(ROUNDS);
        let mut bs = Vec::with_capacity(ROUNDS);
        for _ in 0..ROUNDS {
            let r = random_unit(&self.modulus)?;
            bs.push(mod_square(&r, &self.modulus)?);
            rs.push(r);
        }
        let into_rounds = |values: Vec<BigUint>| -> Result<Rounds, AuthError> {
            values
                .try_into()
                .map_err(|_| AuthError::InvalidParameters("round count".into()))
        };
        Ok(Commitment {
            rs: into_rounds(rs)?,
            bs: into_rounds(bs)?,
        })
    }

    /// Answer the server's challenge bits. Consumes the commitment so its
    /// blinding factors are never reused.
    pub fn respond(
        &self,
        commitment: Commitment,
        challenges: &ChallengeBits,
    ) -> Result<Rounds, AuthError> {
        let mut cs = commitment.rs;
        for (c, &challenge) in cs.iter_mut().zip(challenges.iter()) {
            let factor = mod_pow(&self.secret, &BigUint::from(u8::from(challenge)), &self.modulus)?;
            *c = mod_mul(c, &factor, &self.modulus)?;
        }
        Ok(cs)
    }
}

impl fmt::Debug for Prover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prover")
            .field("modulus_bits", &self.modulus.bits())
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Blinding factors and commitments for one proof.
pub struct Commitment {
    rs: Rounds,
    bs: Rounds,
}

impl Commitment {
    /// `bs[i] = r[i]^2 mod N`, sent with the challenge request.
    pub fn bs(&self) -> &Rounds {
        &self.bs
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commitment")
            .field("rs", &"<redacted>")
            .field("bs", &"<redacted>")
            .finish()
    }
}
