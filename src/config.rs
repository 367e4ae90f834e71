//! Deployment configuration.
//!
//! A single JSON document names the key bundle for every deployment type and
//! the verifier's Fiat-Shamir key. The active deployment comes from the
//! document or, failing that, from `VEIL_DEPLOYMENT`.
//!
//! ```json
//! {
//!   "deployment": "production",
//!   "keys": {
//!     "production": { "encryptionKey": "…32 bytes…", "initialisationVector": "…16…", "vernamKey": "…32…" }
//!   },
//!   "fiatShamir": { "modulus": "3233", "publicSquare": "2146" },
//!   "ivMode": "fixed",
//!   "challengeTtlSecs": 300
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use veil_auth::{FiatShamirKey, DEFAULT_CHALLENGE_TTL_SECS, MAX_CHALLENGE_TTL_SECS};
use veil_crypto::{CryptionKeys, HybridCrypter, IvMode};

use crate::error::{Result, VeilError};

/// Environment variable naming the active deployment type.
pub const DEPLOYMENT_ENV_VAR: &str = "VEIL_DEPLOYMENT";

// ============================================================================
// DeploymentType
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    Production,
    Staging,
    Development,
    Testing,
}

impl DeploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Production => "production",
            DeploymentType::Staging => "staging",
            DeploymentType::Development => "development",
            DeploymentType::Testing => "testing",
        }
    }

    /// Read the deployment type from `VEIL_DEPLOYMENT`.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(DEPLOYMENT_ENV_VAR)
            .map_err(|_| VeilError::Config(format!("{DEPLOYMENT_ENV_VAR} is not set")))?;
        raw.parse()
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentType {
    type Err = VeilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(DeploymentType::Production),
            "staging" => Ok(DeploymentType::Staging),
            "development" => Ok(DeploymentType::Development),
            "testing" => Ok(DeploymentType::Testing),
            other => Err(VeilError::Config(format!(
                "unknown deployment type \"{other}\""
            ))),
        }
    }
}

// ============================================================================
// KeyRing
// ============================================================================

/// One [`CryptionKeys`] bundle per deployment type.
#[derive(Clone, Default, Deserialize)]
#[serde(try_from = "BTreeMap<String, CryptionKeys>")]
pub struct KeyRing {
    bundles: BTreeMap<DeploymentType, CryptionKeys>,
}

impl TryFrom<BTreeMap<String, CryptionKeys>> for KeyRing {
    type Error = VeilError;

    fn try_from(raw: BTreeMap<String, CryptionKeys>) -> Result<Self> {
        let mut ring = KeyRing::default();
        for (name, keys) in raw {
            ring.insert(name.parse()?, keys);
        }
        Ok(ring)
    }
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, deployment: DeploymentType, keys: CryptionKeys) {
        self.bundles.insert(deployment, keys);
    }

    pub fn get(&self, deployment: DeploymentType) -> Result<&CryptionKeys> {
        self.bundles
            .get(&deployment)
            .ok_or(VeilError::MissingKeys(deployment))
    }

    pub fn deployments(&self) -> impl Iterator<Item = DeploymentType> + '_ {
        self.bundles.keys().copied()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bundles.keys()).finish()
    }
}

// ============================================================================
// FiatShamirConfig
// ============================================================================

/// Verifier key as decimal strings.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatShamirConfig {
    pub modulus: String,
    pub public_square: String,
}

impl FiatShamirConfig {
    pub fn key(&self) -> Result<FiatShamirKey> {
        Ok(FiatShamirKey::from_decimal(
            &self.modulus,
            &self.public_square,
        )?)
    }
}

impl fmt::Debug for FiatShamirConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiatShamirConfig")
            .field("modulus", &self.modulus)
            .field("public_square", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// VeilConfig
// ============================================================================

fn default_challenge_ttl_secs() -> u64 {
    DEFAULT_CHALLENGE_TTL_SECS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeilConfig {
    /// Active deployment. Falls back to `VEIL_DEPLOYMENT` when absent.
    #[serde(default)]
    pub deployment: Option<DeploymentType>,
    pub keys: KeyRing,
    pub fiat_shamir: FiatShamirConfig,
    #[serde(default)]
    pub iv_mode: IvMode,
    #[serde(default = "default_challenge_ttl_secs")]
    pub challenge_ttl_secs: u64,
}

impl VeilConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| VeilError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_deployment(mut self, deployment: DeploymentType) -> Self {
        self.deployment = Some(deployment);
        self
    }

    /// The configured deployment, or the one named by `VEIL_DEPLOYMENT`.
    pub fn deployment(&self) -> Result<DeploymentType> {
        match self.deployment {
            Some(deployment) => Ok(deployment),
            None => DeploymentType::from_env(),
        }
    }

    pub fn cryption_keys(&self) -> Result<&CryptionKeys> {
        self.keys.get(self.deployment()?)
    }

    /// Crypter for the active deployment's key bundle.
    pub fn crypter(&self) -> Result<HybridCrypter> {
        Ok(HybridCrypter::new(self.cryption_keys()?, self.iv_mode)?)
    }

    pub fn fiat_shamir_key(&self) -> Result<FiatShamirKey> {
        self.fiat_shamir.key()
    }

    /// Challenge lifetime. Anything above 5 minutes is rejected.
    pub fn challenge_ttl(&self) -> Result<chrono::Duration> {
        if self.challenge_ttl_secs > MAX_CHALLENGE_TTL_SECS {
            return Err(VeilError::Config(format!(
                "challengeTtlSecs {} exceeds the maximum of {MAX_CHALLENGE_TTL_SECS}",
                self.challenge_ttl_secs
            )));
        }
        Ok(chrono::Duration::seconds(self.challenge_ttl_secs as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "deployment": "testing",
        "keys": {
            "testing": {
                "encryptionKey": "an example very very secret key.",
                "initialisationVector": "unique nonce 16b",
                "vernamKey": "0123456789abcdef0123456789abcdef"
            },
            "production": {
                "encryptionKey": "another example very secret key.",
                "initialisationVector": "another nonce 16",
                "vernamKey": "fedcba9876543210fedcba9876543210"
            }
        },
        "fiatShamir": { "modulus": "3233", "publicSquare": "2146" }
    }"#;

    #[test]
    fn parses_full_document_with_defaults() {
        let config = VeilConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.deployment().unwrap(), DeploymentType::Testing);
        assert_eq!(config.iv_mode, IvMode::Fixed);
        assert_eq!(config.challenge_ttl_secs, 300);
        assert_eq!(config.challenge_ttl().unwrap(), chrono::Duration::seconds(300));
        let deployments: Vec<_> = config.keys.deployments().collect();
        assert_eq!(
            deployments,
            vec![DeploymentType::Production, DeploymentType::Testing]
        );
    }

    #[test]
    fn selects_bundle_by_deployment() {
        let config = VeilConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(
            config.cryption_keys().unwrap().vernam_key(),
            b"0123456789abcdef0123456789abcdef"
        );
        let production = config.with_deployment(DeploymentType::Production);
        assert_eq!(
            production.cryption_keys().unwrap().vernam_key(),
            b"fedcba9876543210fedcba9876543210"
        );
    }

    #[test]
    fn missing_bundle_is_reported() {
        let config = VeilConfig::from_json_str(CONFIG)
            .unwrap()
            .with_deployment(DeploymentType::Staging);
        assert!(matches!(
            config.cryption_keys(),
            Err(VeilError::MissingKeys(DeploymentType::Staging))
        ));
    }

    #[test]
    fn rejects_unknown_deployment_and_bad_keys() {
        let unknown = CONFIG.replace("\"production\": {", "\"prod\": {");
        assert!(VeilConfig::from_json_str(&unknown).is_err());

        let short = CONFIG.replace("unique nonce 16b", "short");
        let err = VeilConfig::from_json_str(&short).unwrap_err();
        assert!(err.to_string().contains("initialisation vector"));
    }

    #[test]
    fn explicit_options() {
        let text = CONFIG.replace(
            "\"fiatShamir\"",
            "\"ivMode\": \"perMessage\", \"challengeTtlSecs\": 60, \"fiatShamir\"",
        );
        let config = VeilConfig::from_json_str(&text).unwrap();
        assert_eq!(config.iv_mode, IvMode::PerMessage);
        assert_eq!(config.challenge_ttl().unwrap(), chrono::Duration::seconds(60));
        assert_eq!(config.crypter().unwrap().iv_mode(), IvMode::PerMessage);
    }

    #[test]
    fn challenge_ttl_above_five_minutes_is_rejected() {
        let text = CONFIG.replace(
            "\"fiatShamir\"",
            "\"challengeTtlSecs\": 301, \"fiatShamir\"",
        );
        let config = VeilConfig::from_json_str(&text).unwrap();
        assert!(matches!(config.challenge_ttl(), Err(VeilError::Config(_))));

        let text = CONFIG.replace(
            "\"fiatShamir\"",
            "\"challengeTtlSecs\": 300, \"fiatShamir\"",
        );
        let config = VeilConfig::from_json_str(&text).unwrap();
        assert_eq!(config.challenge_ttl().unwrap(), chrono::Duration::seconds(300));
    }

    #[test]
    fn fiat_shamir_key_parses() {
        let config = VeilConfig::from_json_str(CONFIG).unwrap();
        let key = config.fiat_shamir_key().unwrap();
        assert_eq!(key.modulus().to_string(), "3233");
    }

    #[test]
    fn deployment_names_parse_case_insensitively() {
        assert_eq!(
            " Production ".parse::<DeploymentType>().unwrap(),
            DeploymentType::Production
        );
        assert!("qa".parse::<DeploymentType>().is_err());
        assert_eq!(DeploymentType::Staging.to_string(), "staging");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = VeilConfig::from_json_str(CONFIG).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very secret key"));
        assert!(!debug.contains("2146"));
    }
}
