//! Server-side record of an issued challenge.
//!
//! Stored as JSON under `fiatShamir/<identifier>`:
//! `{ "bs": ["<decimal>"; 32], "challenges": [0|1; 32], "expireDate": "<RFC 3339>" }`

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use veil_crypto::Guid;

use crate::error::AuthError;
use crate::parameters::{ChallengeBits, Rounds, ROUNDS};

/// Default lifetime of an issued challenge (5 minutes).
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 5 * 60;

/// Upper bound on a challenge's lifetime. Longer lifetimes are clamped.
pub const MAX_CHALLENGE_TTL_SECS: u64 = DEFAULT_CHALLENGE_TTL_SECS;

const CHALLENGE_PATH_PREFIX: &str = "fiatShamir";

/// Store path of the challenge record for `identifier`.
pub fn challenge_path(identifier: &Guid) -> String {
    format!("{CHALLENGE_PATH_PREFIX}/{identifier}")
}

#[derive(Clone, PartialEq, Eq)]
pub struct StoredChallenge {
    pub bs: Rounds,
    pub challenges: ChallengeBits,
    pub expire_date: DateTime<Utc>,
}

impl fmt::Debug for StoredChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredChallenge")
            .field("bs", &"<redacted>")
            .field("challenges", &"<redacted>")
            .field("expire_date", &self.expire_date)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredChallengeRecord {
    bs: Vec<String>,
    challenges: Vec<u8>,
    expire_date: DateTime<Utc>,
}

impl StoredChallenge {
    pub fn new(bs: Rounds, challenges: ChallengeBits, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            bs,
            challenges,
            expire_date: now + ttl,
        }
    }

    /// True once `expire_date` is in the past relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_date < now
    }

    pub fn to_json(&self) -> Result<serde_json::Value, AuthError> {
        let record = StoredChallengeRecord {
            bs: self.bs.iter().map(BigUint::to_string).collect(),
            challenges: self.challenges.iter().map(|&bit| u8::from(bit)).collect(),
            expire_date: self.expire_date,
        };
        serde_json::to_value(record).map_err(|e| AuthError::CorruptChallenge(e.to_string()))
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, AuthError> {
        let record: StoredChallengeRecord =
            serde_json::from_value(value).map_err(|e| AuthError::CorruptChallenge(e.to_string()))?;

        if record.bs.len() != ROUNDS || record.challenges.len() != ROUNDS {
            return Err(AuthError::CorruptChallenge(format!(
                "expected {ROUNDS} rounds, got {} bs and {} challenges",
                record.bs.len(),
                record.challenges.len()
            )));
        }

        let bs = record
            .bs
            .iter()
            .map(|digits| {
                BigUint::parse_bytes(digits.as_bytes(), 10)
                    .ok_or_else(|| AuthError::CorruptChallenge("bs element is not decimal".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bs: Rounds = bs
            .try_into()
            .map_err(|_| AuthError::CorruptChallenge("bs length".into()))?;

        let mut challenges = [false; ROUNDS];
        for (bit, &raw) in challenges.iter_mut().zip(&record.challenges) {
            *bit = match raw {
                0 => false,
                1 => true,
                _ => return Err(AuthError::CorruptChallenge("challenge is not 0 or 1".into())),
            };
        }

        Ok(Self {
            bs,
            challenges,
            expire_date: record.expire_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> StoredChallenge {
        let bs: Rounds = std::array::from_fn(|i| BigUint::from(i as u64 * 1_000_003));
        let challenges: ChallengeBits = std::array::from_fn(|i| i % 3 == 0);
        StoredChallenge::new(bs, challenges, now, Duration::seconds(300))
    }

    #[test]
    fn json_round_trip() {
        let stored = sample(Utc::now());
        let json = stored.to_json().unwrap();
        assert!(json["bs"][1].is_string());
        assert_eq!(json["challenges"][0], serde_json::json!(1));
        assert!(json["expireDate"].is_string());
        assert_eq!(StoredChallenge::from_json(json).unwrap(), stored);
    }

    #[test]
    fn expires_after_ttl() {
        let now = Utc::now();
        let stored = sample(now);
        assert_eq!(stored.expire_date, now + Duration::seconds(300));
        assert!(!stored.is_expired(now));
        assert!(!stored.is_expired(now + Duration::seconds(300)));
        assert!(stored.is_expired(now + Duration::seconds(301)));
    }

    #[test]
    fn debug_hides_commitments() {
        let stored = sample(Utc::now());
        let debug = format!("{stored:?}");
        assert!(!debug.contains("1000003"));
        assert!(debug.contains("expire_date"));
    }

    #[test]
    fn path_uses_canonical_identifier() {
        let guid = Guid::parse("3fb9b206-df47-44e0-95b5-59fc7ec50d8d").unwrap();
        assert_eq!(
            challenge_path(&guid),
            "fiatShamir/3FB9B206-DF47-44E0-95B5-59FC7EC50D8D"
        );
    }

    #[test]
    fn corrupt_records_are_rejected() {
        let mut json = sample(Utc::now()).to_json().unwrap();
        json["challenges"][0] = serde_json::json!(7);
        assert!(matches!(
            StoredChallenge::from_json(json),
            Err(AuthError::CorruptChallenge(_))
        ));

        let mut json = sample(Utc::now()).to_json().unwrap();
        json["bs"] = serde_json::json!(["1", "2"]);
        assert!(StoredChallenge::from_json(json).is_err());

        let mut json = sample(Utc::now()).to_json().unwrap();
        json["bs"][0] = serde_json::json!("12abc");
        assert!(StoredChallenge::from_json(json).is_err());

        assert!(StoredChallenge::from_json(serde_json::json!({})).is_err());
    }
}
