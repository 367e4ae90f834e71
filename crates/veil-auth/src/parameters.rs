//! Wire shapes of the identification protocol.
//!
//! - challenge request: `{ identifier, bs: bigint[32] }`
//! - challenge response: `{ challenges: (0|1)[32] }`
//! - proof: `{ identifier, cs: bigint[32] }`

use std::fmt;

use num_bigint::BigUint;
use veil_crypto::{Guid, Map, Value};

use crate::error::AuthError;

/// Number of challenge-response rounds. Soundness error is 2^-ROUNDS.
pub const ROUNDS: usize = 32;

/// One value per round.
pub type Rounds = [BigUint; ROUNDS];

/// One challenge bit per round.
pub type ChallengeBits = [bool; ROUNDS];

fn invalid(message: impl Into<String>) -> AuthError {
    AuthError::InvalidParameters(message.into())
}

fn parse_identifier(object: &Map) -> Result<Guid, AuthError> {
    match object.get("identifier") {
        Some(Value::Guid(guid)) => Ok(*guid),
        Some(Value::String(text)) => {
            Guid::parse(text).map_err(|_| invalid("identifier is not a canonical GUID"))
        }
        Some(_) => Err(invalid("identifier must be a GUID string")),
        None => Err(invalid("missing identifier")),
    }
}

fn parse_rounds(object: &Map, field: &str) -> Result<Rounds, AuthError> {
    let items = match object.get(field) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid(format!("{field} must be an array"))),
        None => return Err(invalid(format!("missing {field}"))),
    };
    if items.len() != ROUNDS {
        return Err(invalid(format!(
            "{field} must have {ROUNDS} elements, got {}",
            items.len()
        )));
    }
    let values = items
        .iter()
        .map(|item| {
            item.as_biguint()
                .ok_or_else(|| invalid(format!("{field} elements must be non-negative big integers")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|_| invalid(format!("{field} must have {ROUNDS} elements")))
}

fn rounds_to_value(rounds: &Rounds) -> Value {
    Value::Array(rounds.iter().cloned().map(Value::from).collect())
}

fn expect_object(value: &Value) -> Result<&Map, AuthError> {
    value
        .as_object()
        .ok_or_else(|| invalid("expected an object"))
}

// ============================================================================
// FiatShamirParameters: the prover's responses
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct FiatShamirParameters {
    pub identifier: Guid,
    pub cs: Rounds,
}

impl FiatShamirParameters {
    pub fn from_value(value: &Value) -> Result<Self, AuthError> {
        let object = expect_object(value)?;
        Ok(Self {
            identifier: parse_identifier(object)?,
            cs: parse_rounds(object, "cs")?,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("identifier", Value::from(self.identifier)),
            ("cs", rounds_to_value(&self.cs)),
        ])
    }
}

impl fmt::Debug for FiatShamirParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiatShamirParameters")
            .field("identifier", &self.identifier)
            .field("cs", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// ChallengeRequest: the prover's commitments
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    pub identifier: Guid,
    pub bs: Rounds,
}

impl ChallengeRequest {
    pub fn from_value(value: &Value) -> Result<Self, AuthError> {
        let object = expect_object(value)?;
        Ok(Self {
            identifier: parse_identifier(object)?,
            bs: parse_rounds(object, "bs")?,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("identifier", Value::from(self.identifier)),
            ("bs", rounds_to_value(&self.bs)),
        ])
    }
}

impl fmt::Debug for ChallengeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeRequest")
            .field("identifier", &self.identifier)
            .field("bs", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Challenge bits
// ============================================================================

/// `{ challenges: [0|1; 32] }`
pub fn challenges_to_value(challenges: &ChallengeBits) -> Value {
    Value::object([(
        "challenges",
        Value::Array(
            challenges
                .iter()
                .map(|&bit| Value::from(u64::from(bit)))
                .collect(),
        ),
    )])
}

/// Parse `{ challenges: [0|1; 32] }`.
pub fn challenges_from_value(value: &Value) -> Result<ChallengeBits, AuthError> {
    let items = value
        .get("challenges")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing challenges"))?;
    if items.len() != ROUNDS {
        return Err(invalid(format!(
            "challenges must have {ROUNDS} elements, got {}",
            items.len()
        )));
    }
    let mut bits = [false; ROUNDS];
    for (bit, item) in bits.iter_mut().zip(items) {
        *bit = match item.as_u64() {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(invalid("challenges must be 0 or 1")),
        };
    }
    Ok(bits)
}
