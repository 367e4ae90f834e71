//! 128-bit identifiers in canonical uppercase 8-4-4-4-12 form.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::CryptoError;

fn canonical_pattern() -> Result<&'static Regex, CryptoError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$")
        })
        .as_ref()
        .map_err(|e| CryptoError::Pattern(e.to_string()))
}

/// Immutable GUID value. Displays as uppercase hyphenated hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Guid {
    /// Mint a random (v4) GUID.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the canonical hyphenated form, in either case.
    ///
    /// Braced, URN and unhyphenated forms are rejected.
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        if !canonical_pattern()?.is_match(text) {
            return Err(CryptoError::InvalidGuid(text.to_string()));
        }
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|_| CryptoError::InvalidGuid(text.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0.hyphenated())
    }
}

impl FromStr for Guid {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
