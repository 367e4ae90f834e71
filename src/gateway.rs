//! Server boundary: challenge issuance and authenticated calls.
//!
//! Every request and response crosses the wire as an encoded string produced
//! by [`HybridCrypter::encode`].

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use veil_auth::{
    challenges_to_value, ChallengeRequest, FiatShamirIdentification, FiatShamirParameters,
    KeyValueStore,
};
use veil_crypto::{HybridCrypter, Map, Value};

use crate::config::VeilConfig;
use crate::error::{Result, VeilError};

/// Payload field carrying the caller's proof.
pub const FIAT_SHAMIR_PARAMETERS: &str = "fiatShamirParameters";

pub struct Gateway {
    crypter: HybridCrypter,
    identification: FiatShamirIdentification,
}

impl Gateway {
    pub fn new(crypter: HybridCrypter, identification: FiatShamirIdentification) -> Self {
        Self {
            crypter,
            identification,
        }
    }

    /// Build a gateway for the active deployment of `config`.
    pub fn from_config(config: &VeilConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let identification = FiatShamirIdentification::new(config.fiat_shamir_key()?, store)
            .with_ttl(config.challenge_ttl()?);
        Ok(Self::new(config.crypter()?, identification))
    }

    pub fn crypter(&self) -> &HybridCrypter {
        &self.crypter
    }

    pub fn identification(&self) -> &FiatShamirIdentification {
        &self.identification
    }

    /// Decode `{ identifier, bs }`, store fresh challenges and return them encoded.
    pub async fn issue_challenges(&self, request: &str) -> Result<String> {
        let decoded = self.crypter.decode(request)?;
        let request = ChallengeRequest::from_value(&decoded)?;
        let challenges = self
            .identification
            .generate_challenges(&request.identifier, request.bs)
            .await?;
        Ok(self.crypter.encode(&challenges_to_value(&challenges))?)
    }

    /// Verify the proof carried in `request`, then run `operation` on the
    /// remaining parameters and return its encoded result.
    ///
    /// The operation never runs when verification fails.
    pub async fn call<F, Fut>(&self, request: &str, operation: F) -> Result<String>
    where
        F: FnOnce(Map) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let mut parameters = self
            .crypter
            .decode(request)?
            .into_object()
            .ok_or_else(|| VeilError::InvalidArgument("payload must be an object".into()))?;

        let Some(proof) = parameters.remove(FIAT_SHAMIR_PARAMETERS) else {
            warn!("call without Fiat-Shamir parameters");
            return Err(VeilError::Unauthenticated(
                "Missing Fiat-Shamir parameters".into(),
            ));
        };
        let proof = FiatShamirParameters::from_value(&proof)?;
        self.identification.verify(&proof).await?;
        debug!(identifier = %proof.identifier, "running authenticated call");

        let result = operation(parameters).await?;
        Ok(self.crypter.encode(&result)?)
    }

    /// SHA-512 pseudonym for an external identity.
    pub fn pseudonym(&self, identity: &str) -> String {
        self.crypter.hash(identity)
    }
}
