//! Verifier configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use passport_disclose_lib::constants::{
    DEFAULT_RPC_URL, PASSPORT_ATTESTATION_ID, REGISTER_CONTRACT_ADDRESS,
};
use passport_disclose_lib::VerificationPolicy;
use serde::{Deserialize, Serialize};

/// Full configuration for a disclosure verifier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub proof: ProofConfig,

    #[serde(default)]
    pub nullifiers: NullifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Scope proofs must be bound to, as a decimal or hex field element.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Attestation id of the accepted document type.
    #[serde(default = "default_attestation_id")]
    pub attestation_id: String,
    /// Attribute requirements, checked in order.
    #[serde(default)]
    pub requirements: Vec<RequirementConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementConfig {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON-RPC endpoint of the chain hosting the register contract.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Address of the register contract.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    /// Seconds to wait for a `checkRoot` call before treating the root as unregistered.
    #[serde(default = "default_registry_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofConfig {
    /// Path to the disclose circuit's verification key.
    #[serde(default = "default_verification_key")]
    pub verification_key: PathBuf,
    /// snarkjs executable.
    #[serde(default = "default_snarkjs_bin")]
    pub snarkjs_bin: String,
    /// Seconds a snarkjs run may take before it is killed.
    #[serde(default = "default_proof_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullifierConfig {
    /// File spent nullifiers are appended to.
    #[serde(default = "default_nullifier_path")]
    pub path: PathBuf,
}

// Default value functions
fn default_scope() -> String {
    "1".into()
}
fn default_attestation_id() -> String {
    PASSPORT_ATTESTATION_ID.into()
}
fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.into()
}
fn default_contract_address() -> String {
    REGISTER_CONTRACT_ADDRESS.into()
}
fn default_verification_key() -> PathBuf {
    PathBuf::from("./artifacts/disclose_vkey.json")
}
fn default_snarkjs_bin() -> String {
    "snarkjs".into()
}
fn default_registry_timeout_secs() -> u64 {
    30
}
fn default_proof_timeout_secs() -> u64 {
    60
}
fn default_nullifier_path() -> PathBuf {
    PathBuf::from("./data/nullifiers.jsonl")
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            attestation_id: default_attestation_id(),
            requirements: Vec::new(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: default_contract_address(),
            timeout_secs: default_registry_timeout_secs(),
        }
    }
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            verification_key: default_verification_key(),
            snarkjs_bin: default_snarkjs_bin(),
            timeout_secs: default_proof_timeout_secs(),
        }
    }
}

impl Default for NullifierConfig {
    fn default() -> Self {
        Self {
            path: default_nullifier_path(),
        }
    }
}

impl VerifierConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: VerifierConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the policy section. Unknown attributes fail here.
    pub fn build_policy(&self) -> anyhow::Result<VerificationPolicy> {
        let requirements: Vec<(&str, &str)> = self
            .policy
            .requirements
            .iter()
            .map(|r| (r.attribute.as_str(), r.value.as_str()))
            .collect();
        VerificationPolicy::new(
            &self.policy.scope,
            &self.policy.attestation_id,
            &requirements,
        )
        .context("invalid verification policy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passport_disclose_lib::Attribute;

    #[test]
    fn test_default_config() {
        let config = VerifierConfig::default();
        assert_eq!(config.policy.scope, "1");
        assert_eq!(config.policy.attestation_id, PASSPORT_ATTESTATION_ID);
        assert_eq!(config.registry.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.proof.snarkjs_bin, "snarkjs");
        assert_eq!(config.registry.timeout_secs, 30);
        assert_eq!(config.proof.timeout_secs, 60);
        assert!(config.policy.requirements.is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = VerifierConfig::default();
        config.policy.requirements.push(RequirementConfig {
            attribute: "nationality".into(),
            value: "France".into(),
        });
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: VerifierConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.policy.requirements, config.policy.requirements);
        assert_eq!(decoded.nullifiers.path, config.nullifiers.path);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = VerifierConfig::load(Path::new("/nonexistent/disclose.toml")).unwrap();
        assert_eq!(config.policy.scope, "1");
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[policy]
scope = "42"
requirements = [
    { attribute = "older_than", value = "18" },
    { attribute = "nationality", value = "France" },
]

[registry]
rpc_url = "http://localhost:8545"

[proof]
timeout_secs = 5
"#;
        let config: VerifierConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.registry.rpc_url, "http://localhost:8545");
        // Defaults for unspecified
        assert_eq!(config.registry.contract_address, REGISTER_CONTRACT_ADDRESS);
        assert_eq!(config.registry.timeout_secs, 30);
        assert_eq!(config.proof.timeout_secs, 5);
        assert_eq!(config.proof.snarkjs_bin, "snarkjs");

        let policy = config.build_policy().unwrap();
        assert_eq!(policy.requirements[0].attribute, Attribute::OlderThan);
        assert_eq!(policy.requirements[1].expected, "France");
    }

    #[test]
    fn test_unknown_attribute_is_a_config_error() {
        let toml_str = r#"
[policy]
requirements = [{ attribute = "favourite_colour", value = "blue" }]
"#;
        let config: VerifierConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.build_policy().is_err());
    }
}
