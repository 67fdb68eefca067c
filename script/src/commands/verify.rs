use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{anyhow, Context};
use clap::Args;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use passport_disclose_lib::crypto::{field_to_decimal, parse_fields};
use passport_disclose_lib::mock::MockProofVerifier;
use passport_disclose_lib::{DisclosureVerifier, Groth16Proof, ProofVerifier, VerificationKey};
use tracing::info;

use crate::config::VerifierConfig;
use crate::nullifiers::FileNullifierStore;
use crate::read_json;
use crate::registry::RpcRootRegistry;
use crate::snarkjs::SnarkjsVerifier;

/// Verify a disclose proof against the configured policy
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Verifier configuration (TOML)
    #[arg(long, short = 'c', default_value = "disclose.toml")]
    pub config: PathBuf,

    /// Write a default configuration file and exit
    #[arg(long)]
    pub init: bool,

    /// snarkjs proof.json
    #[arg(long, required_unless_present = "init")]
    pub proof: Option<PathBuf>,

    /// snarkjs public.json
    #[arg(long, required_unless_present = "init")]
    pub public: Option<PathBuf>,

    /// Override the registry RPC endpoint
    #[arg(long, env = "DISCLOSE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Override the register contract address
    #[arg(long, env = "DISCLOSE_REGISTRY_ADDRESS")]
    pub registry_address: Option<String>,

    /// Override the verification key path
    #[arg(long)]
    pub vkey: Option<PathBuf>,

    /// Check proofs with the mock backend instead of snarkjs
    #[arg(long)]
    pub mock: bool,
}

impl VerifyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        if self.init {
            VerifierConfig::default().save(&self.config)?;
            info!(path = %self.config.display(), "Wrote default config");
            println!(
                "{} {}",
                "Default configuration written to".bright_green(),
                self.config.display()
            );
            return Ok(());
        }

        println!("{}", "Disclosure verification".bright_magenta().bold());
        println!("{}", "═".repeat(50).bright_black());

        let mut config = VerifierConfig::load(&self.config)?;
        if let Some(rpc_url) = &self.rpc_url {
            config.registry.rpc_url = rpc_url.clone();
        }
        if let Some(address) = &self.registry_address {
            config.registry.contract_address = address.clone();
        }
        if let Some(vkey) = &self.vkey {
            config.proof.verification_key = vkey.clone();
        }

        let policy = config.build_policy()?;
        let proof_path = self.proof.as_ref().context("--proof is required")?;
        let public_path = self.public.as_ref().context("--public is required")?;
        let proof: Groth16Proof = read_json(proof_path)?;
        let public: Vec<String> = read_json(public_path)?;
        let signals = parse_fields(&public).context("invalid public signals")?;

        let proof_verifier: Arc<dyn ProofVerifier> = if self.mock {
            Arc::new(MockProofVerifier)
        } else {
            Arc::new(
                SnarkjsVerifier::new(config.proof.snarkjs_bin.clone())
                    .with_timeout(Duration::from_secs(config.proof.timeout_secs)),
            )
        };
        let verification_key = if self.mock {
            VerificationKey::new(serde_json::Value::Null)
        } else {
            read_json(&config.proof.verification_key)?
        };

        let address: Address = config
            .registry
            .contract_address
            .parse()
            .context("invalid register contract address")?;
        let registry = RpcRootRegistry::connect(&config.registry.rpc_url, address)
            .await?
            .with_timeout(Duration::from_secs(config.registry.timeout_secs));
        let nullifiers = FileNullifierStore::open(&config.nullifiers.path).await?;

        println!(
            "{} {}",
            "Registry:".bright_white(),
            config.registry.rpc_url.bright_cyan()
        );
        println!(
            "{} {}",
            "Requirements:".bright_white(),
            policy.requirements.len().to_string().bright_cyan()
        );

        let verifier = DisclosureVerifier::new(
            policy,
            verification_key,
            Arc::new(registry),
            proof_verifier,
        )
        .with_nullifier_store(Arc::new(nullifiers));

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
                .template("{spinner:.magenta} {msg}")?,
        );
        spinner.set_message("Running verification checks...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let outcome = verifier.verify(&signals, &proof).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(disclosure) => {
                println!("{}", "✅ Disclosure accepted".bright_green().bold());
                for requirement in &verifier.policy().requirements {
                    println!(
                        "   {} {}",
                        format!("{}:", requirement.attribute).bright_white(),
                        requirement.expected.bright_cyan()
                    );
                }
                println!(
                    "   {} {}",
                    "nullifier:".bright_white(),
                    field_to_decimal(&disclosure.nullifier()).bright_black()
                );
                Ok(())
            }
            Err(rejection) => {
                println!("{}", "❌ Disclosure rejected".bright_red().bold());
                Err(anyhow!(rejection))
            }
        }
    }
}
