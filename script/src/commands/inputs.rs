use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use colored::*;
use passport_disclose_lib::constants::{BITMAP_LENGTH, PASSPORT_ATTESTATION_ID};
use passport_disclose_lib::crypto::{field_to_decimal, parse_field};
use passport_disclose_lib::inputs::passport_commitment;
use passport_disclose_lib::mock::MockProver;
use passport_disclose_lib::{
    build_disclose_inputs, Attribute, CommitmentTree, DiscloseRequest, PassportData,
};
use tracing::{info, warn};

use crate::{random_secret, read_json, write_json};

/// Build the disclose circuit's witness input
#[derive(Args, Debug)]
pub struct InputsCommand {
    /// Passport data JSON (mrz, signatureAlgorithm, pubKey)
    #[arg(long)]
    pub passport: PathBuf,

    /// JSON array of the commitment tree's leaves, in insertion order
    #[arg(long)]
    pub tree: PathBuf,

    /// Holder secret; a random one is generated if omitted
    #[arg(long)]
    pub secret: Option<String>,

    /// Attestation id the commitment was registered under
    #[arg(long, default_value = PASSPORT_ATTESTATION_ID)]
    pub attestation_id: String,

    /// Age threshold to prove, two digits
    #[arg(long, default_value = "18")]
    pub majority: String,

    /// Attributes to reveal, comma separated; everything is revealed if omitted
    #[arg(long, value_delimiter = ',')]
    pub reveal: Vec<String>,

    #[arg(long, default_value = "1")]
    pub scope: String,

    #[arg(long, default_value = "0")]
    pub user_identifier: String,

    /// Append the holder's commitment to the tree before building the path
    #[arg(long)]
    pub register: bool,

    /// Where to write the witness; printed to stdout if omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Also write proof.json and public.json from the mock prover into this directory
    #[arg(long)]
    pub mock_proof: Option<PathBuf>,
}

/// Disclosure bitmap revealing exactly `attributes`, or everything when empty
fn bitmap_for(attributes: &[String]) -> anyhow::Result<Vec<String>> {
    if attributes.is_empty() {
        return Ok(vec!["1".to_string(); BITMAP_LENGTH]);
    }
    let mut bitmap = vec!["0".to_string(); BITMAP_LENGTH];
    for name in attributes {
        let attribute: Attribute = name.trim().parse()?;
        for i in attribute.byte_range() {
            bitmap[i] = "1".to_string();
        }
    }
    Ok(bitmap)
}

impl InputsCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        println!("{}", "Disclose circuit inputs".bright_magenta().bold());
        println!("{}", "═".repeat(50).bright_black());

        let passport: PassportData = read_json(&self.passport)?;
        let leaves: Vec<String> = read_json(&self.tree)?;
        let mut tree = CommitmentTree::from_decimal_leaves(&leaves)
            .with_context(|| format!("loading tree from {}", self.tree.display()))?;

        let secret = match &self.secret {
            Some(secret) => parse_field(secret).context("invalid secret")?,
            None => {
                warn!("No secret given, generating a random one");
                random_secret()
            }
        };
        let request = DiscloseRequest {
            secret,
            attestation_id: parse_field(&self.attestation_id).context("invalid attestation id")?,
            majority: self.majority.clone(),
            bitmap: bitmap_for(&self.reveal)?,
            scope: parse_field(&self.scope).context("invalid scope")?,
            user_identifier: parse_field(&self.user_identifier)
                .context("invalid user identifier")?,
        };

        if self.register {
            let leaf = passport_commitment(request.secret, request.attestation_id, &passport)?;
            let index = tree.insert(leaf)?;
            info!(index, "Registered commitment in the local tree");
        }

        let witness = build_disclose_inputs(&request, &passport, &tree)
            .context("building disclose inputs")?;

        println!(
            "{} {}",
            "Tree size:".bright_white(),
            tree.size().to_string().bright_cyan()
        );
        println!(
            "{} {}",
            "Merkle root:".bright_white(),
            witness.merkle_root[0].bright_cyan()
        );
        if self.secret.is_none() {
            println!(
                "{} {}",
                "Secret:".bright_white(),
                field_to_decimal(&request.secret).bright_yellow()
            );
        }

        match &self.output {
            Some(path) => {
                write_json(path, &witness)?;
                println!("{} {}", "Witness written to".bright_green(), path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&witness)?),
        }

        if let Some(dir) = &self.mock_proof {
            let (proof, signals) = MockProver::new()
                .prove(&witness)
                .context("mock prover rejected the witness")?;
            let public: Vec<String> = signals.iter().map(field_to_decimal).collect();
            write_json(&dir.join("proof.json"), &proof)?;
            write_json(&dir.join("public.json"), &public)?;
            println!(
                "{} {}",
                "Mock proof written to".bright_green(),
                dir.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_reveals_everything_by_default() {
        let bitmap = bitmap_for(&[]).unwrap();
        assert!(bitmap.iter().all(|b| b == "1"));
    }

    #[test]
    fn test_bitmap_reveals_selected_ranges() {
        let bitmap = bitmap_for(&["nationality".into(), "older_than".into()]).unwrap();
        let revealed: Vec<usize> = bitmap
            .iter()
            .enumerate()
            .filter(|(_, b)| *b == "1")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(revealed, vec![54, 55, 56, 88, 89]);
    }

    #[test]
    fn test_bitmap_rejects_unknown_attribute() {
        assert!(bitmap_for(&["height".into()]).is_err());
    }
}
