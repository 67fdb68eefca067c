use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use passport_disclose_lib::crypto::parse_fields;
use passport_disclose_lib::Groth16Proof;

use crate::read_json;

/// Print a proof and its public signals as Solidity verifier calldata
#[derive(Args, Debug)]
pub struct CalldataCommand {
    /// snarkjs proof.json
    #[arg(long)]
    pub proof: PathBuf,

    /// snarkjs public.json
    #[arg(long)]
    pub public: PathBuf,
}

impl CalldataCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let proof: Groth16Proof = read_json(&self.proof)?;
        let public: Vec<String> = read_json(&self.public)?;
        let signals = parse_fields(&public).context("invalid public signals")?;

        let encoded = proof
            .abi_encode_calldata(&signals)
            .context("encoding calldata")?;
        println!("0x{}", hex::encode(encoded));
        Ok(())
    }
}
