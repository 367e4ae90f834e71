//! JSON values that can carry big integers and GUIDs.
//!
//! Plain JSON has no big-integer type, so the replacer writes a big integer
//! as the string `"<digits>#bigint"` and the reviver turns any string of that
//! shape back into [`Value::BigInt`]. GUIDs are written as their canonical
//! string and come back as [`Value::String`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint, Sign};
use regex::Regex;
use serde_json::Number;

use crate::error::CryptoError;
use crate::guid::Guid;
use crate::types::BIGINT_SUFFIX;

fn bigint_pattern() -> Result<&'static Regex, CryptoError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(-?[0-9]+)#bigint$"))
        .as_ref()
        .map_err(|e| CryptoError::Pattern(e.to_string()))
}

pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    BigInt(BigInt),
    Guid(Guid),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Build an object from `(key, value)` pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    /// Non-negative big integer, if this is one.
    pub fn as_biguint(&self) -> Option<BigUint> {
        self.as_bigint().and_then(BigInt::to_biguint)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Apply the replacer: big integers and GUIDs become strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::BigInt(n) => serde_json::Value::String(format!("{n}{BIGINT_SUFFIX}")),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Apply the reviver: `"<digits>#bigint"` strings become big integers.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CryptoError> {
        Ok(match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => match bigint_pattern()?.captures(&s) {
                Some(caps) => Value::BigInt(parse_bigint(&caps[1])?),
                None => Value::String(s),
            },
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::from_json(v)?)))
                    .collect::<Result<_, CryptoError>>()?,
            ),
        })
    }

    /// Serialize to JSON text through the replacer.
    pub fn to_json_string(&self) -> Result<String, CryptoError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    /// Parse JSON text through the reviver.
    pub fn from_json_str(text: &str) -> Result<Self, CryptoError> {
        Value::from_json(serde_json::from_str(text)?)
    }
}

fn parse_bigint(digits: &str) -> Result<BigInt, CryptoError> {
    BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| CryptoError::InvalidBigInt(digits.to_string()))
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl From<BigUint> for Value {
    fn from(n: BigUint) -> Self {
        Value::BigInt(BigInt::from_biguint(Sign::Plus, n))
    }
}

impl From<Guid> for Value {
    fn from(g: Guid) -> Self {
        Value::Guid(g)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}
