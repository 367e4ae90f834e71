//! Caller side: builds encoded challenge requests and authenticated calls.

use veil_auth::{
    challenges_from_value, ChallengeRequest, Commitment, FiatShamirParameters, Prover,
};
use veil_crypto::{Guid, HybridCrypter, Map, Value};

use crate::error::{Result, VeilError};
use crate::gateway::FIAT_SHAMIR_PARAMETERS;

/// A commitment waiting for the server's challenge bits.
#[derive(Debug)]
pub struct PendingProof {
    identifier: Guid,
    commitment: Commitment,
}

impl PendingProof {
    pub fn identifier(&self) -> &Guid {
        &self.identifier
    }
}

pub struct Client {
    crypter: HybridCrypter,
    prover: Prover,
}

impl Client {
    pub fn new(crypter: HybridCrypter, prover: Prover) -> Self {
        Self { crypter, prover }
    }

    pub fn crypter(&self) -> &HybridCrypter {
        &self.crypter
    }

    pub fn prover(&self) -> &Prover {
        &self.prover
    }

    /// Commit under a fresh identifier. Returns the pending proof and the
    /// encoded `{ identifier, bs }` request.
    pub fn challenge_request(&self) -> Result<(PendingProof, String)> {
        self.challenge_request_for(Guid::new_v4())
    }

    pub fn challenge_request_for(&self, identifier: Guid) -> Result<(PendingProof, String)> {
        let commitment = self.prover.commit()?;
        let request = ChallengeRequest {
            identifier,
            bs: commitment.bs().clone(),
        };
        let text = self.crypter.encode(&request.to_value())?;
        Ok((
            PendingProof {
                identifier,
                commitment,
            },
            text,
        ))
    }

    /// Answer the encoded challenge response and wrap the proof around
    /// `parameters`.
    pub fn authenticated_call(
        &self,
        pending: PendingProof,
        challenge_response: &str,
        mut parameters: Map,
    ) -> Result<String> {
        let challenges = challenges_from_value(&self.crypter.decode(challenge_response)?)?;
        let proof = FiatShamirParameters {
            identifier: pending.identifier,
            cs: self.prover.respond(pending.commitment, &challenges)?,
        };
        if parameters
            .insert(FIAT_SHAMIR_PARAMETERS.to_string(), proof.to_value())
            .is_some()
        {
            return Err(VeilError::InvalidArgument(format!(
                "{FIAT_SHAMIR_PARAMETERS} is reserved"
            )));
        }
        Ok(self.crypter.encode(&Value::Object(parameters))?)
    }

    pub fn decode_response(&self, response: &str) -> Result<Value> {
        Ok(self.crypter.decode(response)?)
    }
}
